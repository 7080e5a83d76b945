// SPDX-License-Identifier: CC0-1.0

//! AST Elements
//!
//! Script encoding and textual display of miniscript fragments.

use core::fmt;
use std::sync::Arc;

use bitcoin::blockdata::{opcodes, script};
use bitcoin::script::PushBytes;
use bitcoin::ScriptBuf;

use super::{ExpansionMap, Miniscript, Terminal};
use crate::Error;

/// Compiles an expanded miniscript to Bitcoin Script.
///
/// The miniscript is fully typechecked first; resource limits are left to
/// the caller.
pub fn compile(expanded: &str, map: &ExpansionMap) -> Result<ScriptBuf, Error> {
    Miniscript::parse(expanded, map).map(|ms| ms.encode())
}

impl Terminal {
    /// The wrapper character and wrapped fragment, if this is a wrapper.
    fn wrap_char(&self) -> Option<(char, &Arc<Miniscript>)> {
        match *self {
            Terminal::Alt(ref sub) => Some(('a', sub)),
            Terminal::Swap(ref sub) => Some(('s', sub)),
            Terminal::Check(ref sub) => Some(('c', sub)),
            Terminal::DupIf(ref sub) => Some(('d', sub)),
            Terminal::Verify(ref sub) => Some(('v', sub)),
            Terminal::NonZero(ref sub) => Some(('j', sub)),
            Terminal::ZeroNotEqual(ref sub) => Some(('n', sub)),
            Terminal::AndV(ref sub, ref r) if r.node == Terminal::True => Some(('t', sub)),
            Terminal::OrI(ref sub, ref r) if r.node == Terminal::False => Some(('u', sub)),
            Terminal::OrI(ref l, ref sub) if l.node == Terminal::False => Some(('l', sub)),
            _ => None,
        }
    }

    /// Encode the element as a fragment of Bitcoin Script.
    pub fn encode(&self, mut builder: script::Builder) -> script::Builder {
        match *self {
            Terminal::PkK(ref key) => builder.push_key(&key.pk),
            Terminal::PkH(ref key) => builder
                .push_opcode(opcodes::all::OP_DUP)
                .push_opcode(opcodes::all::OP_HASH160)
                .push_slice(key.pk.pubkey_hash())
                .push_opcode(opcodes::all::OP_EQUALVERIFY),
            Terminal::After(t) => builder
                .push_int(i64::from(t.to_consensus_u32()))
                .push_opcode(opcodes::all::OP_CLTV),
            Terminal::Older(t) => builder
                .push_int(i64::from(t.to_consensus_u32()))
                .push_opcode(opcodes::all::OP_CSV),
            Terminal::Sha256(ref h) => push_hashlock(builder, opcodes::all::OP_SHA256, h),
            Terminal::Hash256(ref h) => push_hashlock(builder, opcodes::all::OP_HASH256, h),
            Terminal::Ripemd160(ref h) => push_hashlock(builder, opcodes::all::OP_RIPEMD160, h),
            Terminal::Hash160(ref h) => push_hashlock(builder, opcodes::all::OP_HASH160, h),
            Terminal::True => builder.push_opcode(opcodes::OP_TRUE),
            Terminal::False => builder.push_opcode(opcodes::OP_FALSE),
            Terminal::Alt(ref sub) => builder
                .push_opcode(opcodes::all::OP_TOALTSTACK)
                .push_astelem(sub)
                .push_opcode(opcodes::all::OP_FROMALTSTACK),
            Terminal::Swap(ref sub) => builder.push_opcode(opcodes::all::OP_SWAP).push_astelem(sub),
            Terminal::Check(ref sub) => builder
                .push_astelem(sub)
                .push_opcode(opcodes::all::OP_CHECKSIG),
            Terminal::DupIf(ref sub) => builder
                .push_opcode(opcodes::all::OP_DUP)
                .push_opcode(opcodes::all::OP_IF)
                .push_astelem(sub)
                .push_opcode(opcodes::all::OP_ENDIF),
            Terminal::Verify(ref sub) => builder.push_astelem(sub).push_verify(),
            Terminal::NonZero(ref sub) => builder
                .push_opcode(opcodes::all::OP_SIZE)
                .push_opcode(opcodes::all::OP_0NOTEQUAL)
                .push_opcode(opcodes::all::OP_IF)
                .push_astelem(sub)
                .push_opcode(opcodes::all::OP_ENDIF),
            Terminal::ZeroNotEqual(ref sub) => builder
                .push_astelem(sub)
                .push_opcode(opcodes::all::OP_0NOTEQUAL),
            Terminal::AndV(ref left, ref right) => builder.push_astelem(left).push_astelem(right),
            Terminal::AndB(ref left, ref right) => builder
                .push_astelem(left)
                .push_astelem(right)
                .push_opcode(opcodes::all::OP_BOOLAND),
            Terminal::AndOr(ref a, ref b, ref c) => builder
                .push_astelem(a)
                .push_opcode(opcodes::all::OP_NOTIF)
                .push_astelem(c)
                .push_opcode(opcodes::all::OP_ELSE)
                .push_astelem(b)
                .push_opcode(opcodes::all::OP_ENDIF),
            Terminal::OrB(ref left, ref right) => builder
                .push_astelem(left)
                .push_astelem(right)
                .push_opcode(opcodes::all::OP_BOOLOR),
            Terminal::OrD(ref left, ref right) => builder
                .push_astelem(left)
                .push_opcode(opcodes::all::OP_IFDUP)
                .push_opcode(opcodes::all::OP_NOTIF)
                .push_astelem(right)
                .push_opcode(opcodes::all::OP_ENDIF),
            Terminal::OrC(ref left, ref right) => builder
                .push_astelem(left)
                .push_opcode(opcodes::all::OP_NOTIF)
                .push_astelem(right)
                .push_opcode(opcodes::all::OP_ENDIF),
            Terminal::OrI(ref left, ref right) => builder
                .push_opcode(opcodes::all::OP_IF)
                .push_astelem(left)
                .push_opcode(opcodes::all::OP_ELSE)
                .push_astelem(right)
                .push_opcode(opcodes::all::OP_ENDIF),
            Terminal::Thresh(ref thresh) => {
                for (i, sub) in thresh.iter().enumerate() {
                    builder = builder.push_astelem(sub);
                    if i > 0 {
                        builder = builder.push_opcode(opcodes::all::OP_ADD);
                    }
                }
                builder
                    .push_int(thresh.k() as i64)
                    .push_opcode(opcodes::all::OP_EQUAL)
            }
            Terminal::Multi(ref thresh) => {
                builder = builder.push_int(thresh.k() as i64);
                for key in thresh.iter() {
                    builder = builder.push_key(&key.pk);
                }
                builder
                    .push_int(thresh.n() as i64)
                    .push_opcode(opcodes::all::OP_CHECKMULTISIG)
            }
        }
    }
}

fn push_hashlock<const N: usize>(
    builder: script::Builder,
    op: opcodes::Opcode,
    hash: &[u8; N],
) -> script::Builder
where
    [u8; N]: AsRef<PushBytes>,
{
    builder
        .push_opcode(opcodes::all::OP_SIZE)
        .push_int(32)
        .push_opcode(opcodes::all::OP_EQUALVERIFY)
        .push_opcode(op)
        .push_slice(*hash)
        .push_opcode(opcodes::all::OP_EQUAL)
}

/// Helper trait to add a `push_astelem` method to `script::Builder`
trait PushAstElem {
    fn push_astelem(self, ast: &Miniscript) -> Self;
}

impl PushAstElem for script::Builder {
    fn push_astelem(self, ast: &Miniscript) -> Self { ast.node.encode(self) }
}

impl Miniscript {
    /// Encode as a Bitcoin script.
    pub fn encode(&self) -> ScriptBuf { self.node.encode(script::Builder::new()).into_script() }
}

impl fmt::Display for Miniscript {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { fmt::Display::fmt(&self.node, f) }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use bitcoin::hex::DisplayHex;

        match *self {
            Terminal::PkK(ref key) => write!(f, "pk_k({})", key),
            Terminal::PkH(ref key) => write!(f, "pk_h({})", key),
            Terminal::After(t) => write!(f, "after({})", t),
            Terminal::Older(t) => write!(f, "older({})", t),
            Terminal::Sha256(ref h) => write!(f, "sha256({})", h.as_hex()),
            Terminal::Hash256(ref h) => write!(f, "hash256({})", h.as_hex()),
            Terminal::Ripemd160(ref h) => write!(f, "ripemd160({})", h.as_hex()),
            Terminal::Hash160(ref h) => write!(f, "hash160({})", h.as_hex()),
            Terminal::True => f.write_str("1"),
            Terminal::False => f.write_str("0"),
            Terminal::AndV(ref l, ref r) if r.node != Terminal::True => {
                write!(f, "and_v({},{})", l, r)
            }
            Terminal::AndB(ref l, ref r) => write!(f, "and_b({},{})", l, r),
            Terminal::AndOr(ref a, ref b, ref c) => {
                if c.node == Terminal::False {
                    write!(f, "and_n({},{})", a, b)
                } else {
                    write!(f, "andor({},{},{})", a, b, c)
                }
            }
            Terminal::OrB(ref l, ref r) => write!(f, "or_b({},{})", l, r),
            Terminal::OrD(ref l, ref r) => write!(f, "or_d({},{})", l, r),
            Terminal::OrC(ref l, ref r) => write!(f, "or_c({},{})", l, r),
            Terminal::OrI(ref l, ref r)
                if l.node != Terminal::False && r.node != Terminal::False =>
            {
                write!(f, "or_i({},{})", l, r)
            }
            Terminal::Thresh(ref thresh) => {
                write!(f, "thresh({}", thresh.k())?;
                for s in thresh.iter() {
                    write!(f, ",{}", s)?;
                }
                f.write_str(")")
            }
            Terminal::Multi(ref thresh) => {
                write!(f, "multi({}", thresh.k())?;
                for key in thresh.iter() {
                    write!(f, ",{}", key)?;
                }
                f.write_str(")")
            }
            // wrappers
            _ => {
                let (ch, sub) = match self.wrap_char() {
                    Some(wrapped) => wrapped,
                    None => return Ok(()),
                };
                if ch == 'c' {
                    // alias: pk(K) = c:pk_k(K), pkh(K) = c:pk_h(K)
                    if let Terminal::PkK(ref key) = sub.node {
                        return write!(f, "pk({})", key);
                    } else if let Terminal::PkH(ref key) = sub.node {
                        return write!(f, "pkh({})", key);
                    }
                }

                fmt::Write::write_char(f, ch)?;
                match sub.node.wrap_char() {
                    None => fmt::Write::write_char(f, ':')?,
                    // tvc:pk_k() -> tv:pk()
                    Some(('c', ms)) => {
                        if let Terminal::PkK(_) | Terminal::PkH(_) = ms.node {
                            fmt::Write::write_char(f, ':')?;
                        }
                    }
                    _ => {}
                };
                write!(f, "{}", sub)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::hex::DisplayHex;
    use bitcoin::secp256k1::Secp256k1;
    use bitcoin::Network;

    use super::*;
    use crate::descriptor::key::KeyContext;
    use crate::miniscript::expand;

    const K0: &str = "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2";
    const K1: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";

    fn compile_text(text: &str) -> (ScriptBuf, String, ExpansionMap) {
        let ctx = KeyContext::segwit(Network::Bitcoin);
        let (expanded, map) = expand(text, &ctx, &Secp256k1::new()).unwrap();
        (compile(&expanded, &map).unwrap(), expanded, map)
    }

    #[test]
    fn encode_pk() {
        let (script, _, _) = compile_text(&format!("pk({})", K0));
        assert_eq!(script.as_bytes().to_lower_hex_string(), format!("21{}ac", K0));
    }

    #[test]
    fn encode_multi() {
        let (script, _, _) = compile_text(&format!("multi(1,{},{})", K0, K1));
        assert_eq!(
            script.as_bytes().to_lower_hex_string(),
            format!("5121{}21{}52ae", K0, K1)
        );
    }

    #[test]
    fn encode_timelocks_and_hashes() {
        let (script, _, _) = compile_text(&format!("and_v(v:pk({}),older(144))", K0));
        assert_eq!(script.as_bytes().to_lower_hex_string(), format!("21{}ad029000b2", K0));

        let hash = "6c60f404f8167a38fc70eaf8aa17ac351023bef86bcb9d1086a19afe95bd5333";
        let (script, _, _) = compile_text(&format!("and_v(v:pk({}),sha256({}))", K0, hash));
        assert_eq!(
            script.as_bytes().to_lower_hex_string(),
            format!("21{}ad82012088a820{}87", K0, hash)
        );
    }

    #[test]
    fn encode_or_d() {
        // or_d(pk(A),pkh(B)): <A> CHECKSIG IFDUP NOTIF DUP HASH160 <h(B)> EQUALVERIFY CHECKSIG ENDIF
        let (script, _, map) = compile_text(&format!("or_d(pk({}),pkh({}))", K0, K1));
        let hash = map.get(1).unwrap().public_key().pubkey_hash();
        assert_eq!(
            script.as_bytes().to_lower_hex_string(),
            format!("21{}ac736476a914{}88ac68", K0, hash)
        );
    }

    #[test]
    fn compile_is_deterministic() {
        let text = format!("andor(pk({}),older(1000),pk({}))", K0, K1);
        let (a, expanded, map) = compile_text(&text);
        for _ in 0..3 {
            assert_eq!(compile(&expanded, &map).unwrap(), a);
        }
    }

    #[test]
    fn display_normalizes_aliases() {
        let (_, _, map) = compile_text(&format!("multi(1,{},{})", K0, K1));
        for s in [
            "pk(@0)",
            "pkh(@0)",
            "and_v(v:pk(@0),pk(@1))",
            "or_d(pk(@0),and_v(v:pkh(@1),older(144)))",
            "and_n(pk(@0),l:older(10))",
            "andor(pk(@0),after(1000),pk(@1))",
            "thresh(2,pk(@0),s:pk(@1),sln:after(100))",
            "t:or_c(pk(@0),v:pk(@1))",
            "multi(1,@0,@1)",
        ] {
            let ms = Miniscript::parse(s, &map).unwrap();
            assert_eq!(ms.to_string(), s);
        }
    }
}
