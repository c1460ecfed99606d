/// Arithmetic evaluator for player-built expressions.
///
/// Grammar (nothing else is accepted, not even whitespace):
///   expr  := digit (op digit)*
///   op    := '+' | '-' | '*'
///   digit := '0'..='9'
///
/// `*` binds tighter than `+`/`-`; `+`/`-` are left-associative.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("expected a digit at position {0}")]
    ExpectedDigit(usize),
    #[error("expected an operator at position {0}")]
    ExpectedOperator(usize),
    #[error("expression ends with an operator")]
    TrailingOperator,
    #[error("result does not fit in 64 bits")]
    Overflow,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Op {
    Add,
    Sub,
    Mul,
}

impl Op {
    fn from_char(c: char) -> Option<Op> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' => Some(Op::Mul),
            _ => None,
        }
    }
}

/// Split into operands and operators, enforcing strict alternation.
fn tokenize(src: &str) -> Result<(Vec<i64>, Vec<Op>), ExprError> {
    if src.is_empty() { return Err(ExprError::Empty); }

    let mut operands = Vec::new();
    let mut ops = Vec::new();

    for (pos, c) in src.chars().enumerate() {
        let want_digit = operands.len() == ops.len();
        if want_digit {
            let d = c.to_digit(10).ok_or(ExprError::ExpectedDigit(pos))?;
            operands.push(d as i64);
        } else {
            let op = Op::from_char(c).ok_or(ExprError::ExpectedOperator(pos))?;
            ops.push(op);
        }
    }

    if operands.len() == ops.len() {
        return Err(ExprError::TrailingOperator);
    }
    Ok((operands, ops))
}

pub fn evaluate(src: &str) -> Result<i64, ExprError> {
    let (operands, ops) = tokenize(src)?;

    // Fold products first, then sum terms left to right.
    let mut terms: Vec<i64> = vec![operands[0]];
    // true = subtract the matching term
    let mut negate: Vec<bool> = Vec::new();
    for (op, &rhs) in ops.iter().zip(operands.iter().skip(1)) {
        match op {
            Op::Mul => {
                if let Some(last) = terms.last_mut() {
                    *last = last.checked_mul(rhs).ok_or(ExprError::Overflow)?;
                }
            }
            Op::Add | Op::Sub => {
                negate.push(*op == Op::Sub);
                terms.push(rhs);
            }
        }
    }

    negate
        .iter()
        .zip(terms.iter().skip(1))
        .try_fold(terms[0], |acc, (&neg, &term)| {
            if neg { acc.checked_sub(term) } else { acc.checked_add(term) }
        })
        .ok_or(ExprError::Overflow)
}
