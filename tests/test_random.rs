// SPDX-License-Identifier: CC0-1.0

//! # Randomized satisfaction test
//!
//! Generates well-typed miniscripts from the fragment set, picks random
//! signers and preimages, and checks that a witness is built exactly when
//! a plan exists, that it passes libbitcoinconsensus and that its size
//! matches the plan's estimate.

use bitcoin::secp256k1::Secp256k1;
use bitcoin::{absolute, Network, Sequence, Transaction};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use script_descriptors::miniscript::satisfy::Placeholder;
use script_descriptors::{Descriptor, DescriptorOptions, Error, Preimage, TimeConstraints};

mod setup;

use setup::{spending_tx, verify_input, TestData, HASH_KINDS};

const CASES: usize = 300;
const MAX_DEPTH: usize = 3;
// three levels of three children, each with up to three keys
const KEYS: usize = 81;

/// Builds random miniscripts in `K<i>` / `<hash>(H)` notation.
///
/// Every fragment is safe and non-malleable. Key-like fragments are also
/// dissatisfiable with a unique dissatisfaction, so they can sit where
/// `or_d`, `andor` and `thresh` need one. Timelocks are all height based.
struct Generator<'r> {
    rng: &'r mut StdRng,
    next_key: usize,
}

impl Generator<'_> {
    fn key(&mut self) -> String {
        self.next_key += 1;
        format!("K{}", self.next_key)
    }

    /// A safe `Bdu` fragment whose only dissatisfaction is unique.
    fn key_like(&mut self, depth: usize) -> String {
        let choices = if depth >= MAX_DEPTH { 3 } else { 7 };
        match self.rng.gen_range(0..choices) {
            0 => format!("pk({})", self.key()),
            1 => format!("pkh({})", self.key()),
            2 => {
                let n = self.rng.gen_range(1..=3);
                let k = self.rng.gen_range(1..=n);
                let keys = (0..n).map(|_| self.key()).collect::<Vec<_>>();
                format!("multi({},{})", k, keys.join(","))
            }
            3 => format!("or_d({},{})", self.key_like(depth + 1), self.key_like(depth + 1)),
            4 => format!("or_b({},a:{})", self.key_like(depth + 1), self.key_like(depth + 1)),
            5 => format!(
                "andor({},{},{})",
                self.key_like(depth + 1),
                self.key_like(depth + 1),
                self.key_like(depth + 1)
            ),
            _ => {
                let n = self.rng.gen_range(2..=3);
                let k = self.rng.gen_range(1..=n);
                let mut subs = vec![self.key_like(depth + 1)];
                subs.extend((1..n).map(|_| format!("a:{}", self.key_like(depth + 1))));
                format!("thresh({},{})", k, subs.join(","))
            }
        }
    }

    /// An unsafe `B` fragment: a timelock or a hashlock.
    fn lock(&mut self) -> String {
        match self.rng.gen_range(0..3) {
            0 => format!("older({})", self.rng.gen_range(1..=1000)),
            1 => format!("after({})", self.rng.gen_range(1..=1000)),
            _ => {
                let kind = HASH_KINDS.choose(&mut *self.rng).map_or("sha256", |kind| kind.name());
                format!("{}(H)", kind)
            }
        }
    }

    /// A safe `B` fragment.
    fn safe(&mut self, depth: usize) -> String {
        if depth >= MAX_DEPTH {
            return self.key_like(depth);
        }
        match self.rng.gen_range(0..6) {
            0 => self.key_like(depth),
            1 => format!("and_v(v:{},{})", self.safe(depth + 1), self.lock()),
            2 => format!("and_v(v:{},{})", self.safe(depth + 1), self.safe(depth + 1)),
            3 => format!("or_i({},{})", self.safe(depth + 1), self.safe(depth + 1)),
            4 => format!("or_d({},{})", self.key_like(depth + 1), self.safe(depth + 1)),
            _ => {
                let middle =
                    if self.rng.gen_bool(0.5) { self.lock() } else { self.safe(depth + 1) };
                format!("andor({},{},{})", self.key_like(depth + 1), middle, self.safe(depth + 1))
            }
        }
    }
}

/// The serialized size of a witness stack, as `Plan::witness_size` counts it.
fn stack_size(stack: &[Vec<u8>]) -> usize {
    let varint = |n: usize| bitcoin::VarInt(n as u64).size();
    stack.iter().map(|item| varint(item.len()) + item.len()).sum::<usize>() + varint(stack.len())
}

/// A transaction any height based timelock of the generated scripts allows.
fn permissive_constraints() -> TimeConstraints {
    TimeConstraints::new(
        Some(absolute::LockTime::from_consensus(499_999_999)),
        Some(Sequence::from_height(u16::MAX)),
    )
    .unwrap()
}

fn check_case(data: &TestData, rng: &mut StdRng, text: &str, n_keys: usize) -> bool {
    let signers = (1..=n_keys).filter(|_| rng.gen_bool(0.6)).collect::<Vec<_>>();
    let preimages = data
        .preimages
        .iter()
        .filter(|_| rng.gen_bool(0.5))
        .cloned()
        .collect::<Vec<Preimage>>();

    let options = DescriptorOptions::new(Network::Bitcoin)
        .with_signers(signers.iter().map(|i| data.pk(*i)).collect())
        .with_preimages(preimages);
    let desc = match Descriptor::new(&data.subs(text), &options, &Secp256k1::new()) {
        Ok(desc) => desc,
        // large scripts may run into the standardness limits
        Err(Error::ResourceLimitExceeded { .. }) => return false,
        Err(e) => panic!("generated `{}` did not parse: {}", text, e),
    };

    let plan = match desc.plan() {
        Ok(plan) => plan.clone(),
        Err(_) => {
            let tx = spending_tx(&permissive_constraints());
            let sigs = data.sign_input(&tx, 0, &desc, &signers);
            assert!(
                desc.satisfy_committed(&sigs, &permissive_constraints()).is_err(),
                "satisfied `{}` without a plan, signers {:?}",
                text,
                signers
            );
            return true;
        }
    };

    let mut tx: Transaction = spending_tx(&plan.time_constraints());
    let sigs = data.sign_input(&tx, 0, &desc, &signers);
    let satisfied = desc
        .script_satisfaction(&sigs)
        .unwrap_or_else(|e| panic!("no witness for `{}` with plan {}: {}", text, plan, e));
    assert_eq!(satisfied.lock_time, plan.time_constraints().lock_time());
    assert_eq!(satisfied.sequence, plan.time_constraints().sequence());

    // signatures are 71 to 73 bytes against the 73 the plan assumes
    let n_sigs =
        plan.stack.iter().filter(|item| matches!(item, Placeholder::EcdsaSig(_))).count();
    let actual = stack_size(&satisfied.stack);
    assert!(actual <= plan.witness_size(), "`{}`: {} > {}", text, actual, plan.witness_size());
    assert!(plan.witness_size() - actual <= 4 * n_sigs, "`{}`: plan {}", text, plan);

    let (script_sig, witness) = desc.satisfy(&sigs).unwrap();
    tx.input[0].script_sig = script_sig;
    tx.input[0].witness = witness;
    assert_eq!(verify_input(&tx, 0, &desc), Ok(()), "`{}` with plan {}", text, plan);
    true
}

#[test]
fn random_miniscripts() {
    let data = TestData::new(KEYS);
    let mut rng = StdRng::seed_from_u64(0x6d73);
    let mut checked = 0;
    for _ in 0..CASES {
        let (text, n_keys) = {
            let mut generator = Generator { rng: &mut rng, next_key: 0 };
            let ms = generator.safe(0);
            let text = if generator.rng.gen_bool(0.5) {
                format!("wsh({})", ms)
            } else {
                format!("sh(wsh({}))", ms)
            };
            (text, generator.next_key)
        };
        if check_case(&data, &mut rng, &text, n_keys) {
            checked += 1;
        }
    }
    assert!(checked > CASES / 2, "only {} of {} cases checked", checked, CASES);
}
