// SPDX-License-Identifier: CC0-1.0

//! Correctness/Soundness type properties

use super::ErrorKind;

/// Basic type representing where the fragment can go
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Base {
    /// Takes its inputs from the top of the stack. Pushes
    /// nonzero if the condition is satisfied. If not, if it
    /// does not abort, then 0 is pushed.
    B,
    /// Takes its inputs from the top of the stack. Pushes a
    /// public key, regardless of satisfaction, onto the stack.
    /// Must be wrapped in `c:` to turn into any other type.
    K,
    /// Takes its inputs from the top of the stack, which
    /// must satisfy the condition (will abort otherwise).
    /// Does not push anything onto the stack.
    V,
    /// Takes from the stack its inputs + element X at the top.
    /// If the inputs satisfy the condition, [nonzero X] or
    /// [X nonzero] is pushed. If not, if it does not abort,
    /// then [0 X] or [X 0] is pushed.
    W,
}

/// How many stack elements the fragment consumes.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Input {
    /// Consumes no stack elements under any circumstances
    Zero,
    /// Consumes exactly one stack element under all circumstances
    One,
    /// Consumes any number of stack elements
    Any,
    /// Consumes exactly one stack element. If the fragment is
    /// satisfied, this element must be nonzero.
    OneNonZero,
    /// Consumes 1 or more stack elements. If the fragment is
    /// satisfied, the top element must be nonzero.
    AnyNonZero,
}

impl Input {
    const fn is_one(self) -> bool { matches!(self, Input::One | Input::OneNonZero) }

    const fn is_nonzero(self) -> bool { matches!(self, Input::OneNonZero | Input::AnyNonZero) }

    // Shared by and_b and and_v, which execute both children.
    const fn sequential(left: Input, right: Input) -> Input {
        match (left, right) {
            (Input::Zero, Input::Zero) => Input::Zero,
            (Input::Zero, Input::One) | (Input::One, Input::Zero) => Input::One,
            (Input::Zero, Input::OneNonZero) | (Input::OneNonZero, Input::Zero) => {
                Input::OneNonZero
            }
            (Input::OneNonZero, _) | (Input::AnyNonZero, _) | (Input::Zero, Input::AnyNonZero) => {
                Input::AnyNonZero
            }
            _ => Input::Any,
        }
    }
}

/// Type properties relevant to completeness (every branch reachable with
/// some witness) and soundness (no way to satisfy the script without
/// satisfying one of its branches).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Correctness {
    /// The base type
    pub base: Base,
    /// Properties of the inputs
    pub input: Input,
    /// Whether it is definitely possible to dissatisfy the expression.
    pub dissatisfiable: bool,
    /// Whether the fragment's "nonzero" output on satisfaction is
    /// always the constant 1.
    pub unit: bool,
}

impl Correctness {
    const fn new(base: Base, input: Input, dissatisfiable: bool, unit: bool) -> Self {
        Correctness { base, input, dissatisfiable, unit }
    }

    /// `1`
    pub const TRUE: Self = Correctness::new(Base::B, Input::Zero, false, true);
    /// `0`
    pub const FALSE: Self = Correctness::new(Base::B, Input::Zero, true, true);
    /// `pk_k`
    pub const PK_K: Self = Correctness::new(Base::K, Input::OneNonZero, true, true);
    /// `pk_h`
    pub const PK_H: Self = Correctness::new(Base::K, Input::AnyNonZero, true, true);
    /// `multi` and `sortedmulti`
    pub const MULTI: Self = Correctness::new(Base::B, Input::AnyNonZero, true, true);
    /// The hash fragments
    pub const HASH: Self = Correctness::new(Base::B, Input::OneNonZero, true, true);
    /// `after` and `older`
    pub const TIME: Self = Correctness::new(Base::B, Input::Zero, false, false);

    /// `a:`
    pub fn cast_alt(self) -> Result<Self, ErrorKind> {
        match self.base {
            Base::B => Ok(Correctness::new(Base::W, Input::Any, self.dissatisfiable, self.unit)),
            x => Err(ErrorKind::ChildBase1(x)),
        }
    }

    /// `s:`
    pub fn cast_swap(self) -> Result<Self, ErrorKind> {
        if self.base != Base::B {
            return Err(ErrorKind::ChildBase1(self.base));
        }
        if !self.input.is_one() {
            return Err(ErrorKind::SwapNonOne);
        }
        Ok(Correctness::new(Base::W, Input::Any, self.dissatisfiable, self.unit))
    }

    /// `c:`
    pub fn cast_check(self) -> Result<Self, ErrorKind> {
        match self.base {
            Base::K => Ok(Correctness::new(Base::B, self.input, self.dissatisfiable, true)),
            x => Err(ErrorKind::ChildBase1(x)),
        }
    }

    /// `d:`
    pub fn cast_dupif(self) -> Result<Self, ErrorKind> {
        if self.base != Base::V {
            return Err(ErrorKind::ChildBase1(self.base));
        }
        if self.input != Input::Zero {
            return Err(ErrorKind::NonZeroDupIf);
        }
        Ok(Correctness::new(Base::B, Input::OneNonZero, true, true))
    }

    /// `v:`
    pub fn cast_verify(self) -> Result<Self, ErrorKind> {
        match self.base {
            Base::B => Ok(Correctness::new(Base::V, self.input, false, false)),
            x => Err(ErrorKind::ChildBase1(x)),
        }
    }

    /// `j:`
    pub fn cast_nonzero(self) -> Result<Self, ErrorKind> {
        if self.base != Base::B {
            return Err(ErrorKind::ChildBase1(self.base));
        }
        if !self.input.is_nonzero() {
            return Err(ErrorKind::NonZeroZero);
        }
        Ok(Correctness::new(Base::B, self.input, true, self.unit))
    }

    /// `n:`
    pub fn cast_zeronotequal(self) -> Result<Self, ErrorKind> {
        match self.base {
            Base::B => Ok(Correctness::new(Base::B, self.input, self.dissatisfiable, true)),
            x => Err(ErrorKind::ChildBase1(x)),
        }
    }

    /// `and_b`
    pub fn and_b(left: Self, right: Self) -> Result<Self, ErrorKind> {
        match (left.base, right.base) {
            (Base::B, Base::W) => Ok(Correctness::new(
                Base::B,
                Input::sequential(left.input, right.input),
                left.dissatisfiable && right.dissatisfiable,
                true,
            )),
            (x, y) => Err(ErrorKind::ChildBase2(x, y)),
        }
    }

    /// `and_v`
    pub fn and_v(left: Self, right: Self) -> Result<Self, ErrorKind> {
        let base = match (left.base, right.base) {
            (Base::V, Base::B) => Base::B,
            (Base::V, Base::K) => Base::K,
            (Base::V, Base::V) => Base::V,
            (x, y) => return Err(ErrorKind::ChildBase2(x, y)),
        };
        Ok(Correctness::new(base, Input::sequential(left.input, right.input), false, right.unit))
    }

    /// `or_b`
    pub fn or_b(left: Self, right: Self) -> Result<Self, ErrorKind> {
        if !left.dissatisfiable {
            return Err(ErrorKind::LeftNotDissatisfiable);
        }
        if !right.dissatisfiable {
            return Err(ErrorKind::RightNotDissatisfiable);
        }
        if (left.base, right.base) != (Base::B, Base::W) {
            return Err(ErrorKind::ChildBase2(left.base, right.base));
        }
        let input = match (left.input, right.input) {
            (Input::Zero, Input::Zero) => Input::Zero,
            (Input::Zero, x) | (x, Input::Zero) if x.is_one() => Input::One,
            _ => Input::Any,
        };
        Ok(Correctness::new(Base::B, input, true, true))
    }

    /// `or_d`
    pub fn or_d(left: Self, right: Self) -> Result<Self, ErrorKind> {
        Self::check_or_left(left)?;
        if (left.base, right.base) != (Base::B, Base::B) {
            return Err(ErrorKind::ChildBase2(left.base, right.base));
        }
        Ok(Correctness::new(
            Base::B,
            Self::or_input(left.input, right.input),
            right.dissatisfiable,
            right.unit,
        ))
    }

    /// `or_c`
    pub fn or_c(left: Self, right: Self) -> Result<Self, ErrorKind> {
        Self::check_or_left(left)?;
        if (left.base, right.base) != (Base::B, Base::V) {
            return Err(ErrorKind::ChildBase2(left.base, right.base));
        }
        Ok(Correctness::new(Base::V, Self::or_input(left.input, right.input), false, false))
    }

    /// `or_i`
    pub fn or_i(left: Self, right: Self) -> Result<Self, ErrorKind> {
        let base = match (left.base, right.base) {
            (Base::B, Base::B) => Base::B,
            (Base::V, Base::V) => Base::V,
            (Base::K, Base::K) => Base::K,
            (x, y) => return Err(ErrorKind::ChildBase2(x, y)),
        };
        let input = match (left.input, right.input) {
            (Input::Zero, Input::Zero) => Input::One,
            _ => Input::Any,
        };
        Ok(Correctness::new(
            base,
            input,
            left.dissatisfiable || right.dissatisfiable,
            left.unit && right.unit,
        ))
    }

    /// `andor`
    pub fn and_or(a: Self, b: Self, c: Self) -> Result<Self, ErrorKind> {
        Self::check_or_left(a)?;
        let base = match (a.base, b.base, c.base) {
            (Base::B, Base::B, Base::B) => Base::B,
            (Base::B, Base::K, Base::K) => Base::K,
            (Base::B, Base::V, Base::V) => Base::V,
            (x, y, z) => return Err(ErrorKind::ChildBase3(x, y, z)),
        };
        let input = match (a.input, b.input, c.input) {
            (Input::Zero, Input::Zero, Input::Zero) => Input::Zero,
            (Input::Zero, y, z) if y.is_one() && z.is_one() => Input::One,
            (x, Input::Zero, Input::Zero) if x.is_one() => Input::One,
            _ => Input::Any,
        };
        Ok(Correctness::new(base, input, c.dissatisfiable, b.unit && c.unit))
    }

    /// `thresh`
    pub fn threshold<'a, I>(subs: I) -> Result<Self, ErrorKind>
    where
        I: ExactSizeIterator<Item = &'a Self>,
    {
        let mut zero_count = 0;
        let mut one_count = 0;
        let n = subs.len();
        for (i, sub) in subs.enumerate() {
            let expected = if i == 0 { Base::B } else { Base::W };
            if sub.base != expected {
                return Err(ErrorKind::ThresholdBase(i, sub.base));
            }
            if !sub.unit {
                return Err(ErrorKind::ThresholdNonUnit(i));
            }
            if !sub.dissatisfiable {
                return Err(ErrorKind::ThresholdDissat(i));
            }
            zero_count += usize::from(sub.input == Input::Zero);
            one_count += usize::from(sub.input.is_one());
        }
        let input = if zero_count == n {
            Input::Zero
        } else if one_count == 1 && zero_count + 1 == n {
            Input::One
        } else {
            Input::Any
        };
        Ok(Correctness::new(Base::B, input, true, true))
    }

    fn check_or_left(left: Self) -> Result<(), ErrorKind> {
        if !left.dissatisfiable {
            return Err(ErrorKind::LeftNotDissatisfiable);
        }
        if !left.unit {
            return Err(ErrorKind::LeftNotUnit);
        }
        Ok(())
    }

    // Shared by or_c and or_d, where the right child only runs after the left fails.
    fn or_input(left: Input, right: Input) -> Input {
        match (left, right) {
            (Input::Zero, Input::Zero) => Input::Zero,
            (x, Input::Zero) if x.is_one() => Input::One,
            _ => Input::Any,
        }
    }
}
