//! Operator overloading for `Expr`.
//!
//! Addition, subtraction and negation combine expressions; multiplication
//! and division take a scalar. Products of two expressions go through
//! [`Expr::try_mul`] since they can exceed degree two.

use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use super::expression::Expr;

/// Add `sign * rhs` into `target`.
fn accumulate(target: &mut Expr, rhs: &Expr, sign: f64) {
    if sign == 1.0 {
        target.add_in_place(rhs);
    } else {
        target.add_in_place(&rhs.scale(sign));
    }
}

macro_rules! impl_expr_binop {
    ($trait:ident, $method:ident, $assign:ident, $assign_method:ident, $sign:expr) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;

            fn $method(mut self, rhs: Expr) -> Expr {
                accumulate(&mut self, &rhs, $sign);
                self
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;

            fn $method(mut self, rhs: &Expr) -> Expr {
                accumulate(&mut self, rhs, $sign);
                self
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                self.clone().$method(&rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                self.clone().$method(rhs)
            }
        }

        impl $assign<Expr> for Expr {
            fn $assign_method(&mut self, rhs: Expr) {
                accumulate(self, &rhs, $sign);
            }
        }

        impl $assign<&Expr> for Expr {
            fn $assign_method(&mut self, rhs: &Expr) {
                accumulate(self, rhs, $sign);
            }
        }
    };
}

impl_expr_binop!(Add, add, AddAssign, add_assign, 1.0);
impl_expr_binop!(Sub, sub, SubAssign, sub_assign, -1.0);

impl Neg for Expr {
    type Output = Expr;

    fn neg(mut self) -> Expr {
        self.scale_in_place(-1.0);
        self
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.scale(-1.0)
    }
}

// Scalars shift the offset (+, -) or scale every coefficient (*, /).
macro_rules! impl_scalar_op {
    ($trait:ident, $method:ident, |$e:ident, $k:ident| $body:expr) => {
        impl $trait<f64> for Expr {
            type Output = Expr;

            fn $method(mut self, $k: f64) -> Expr {
                let $e = &mut self;
                $body;
                self
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                self.clone().$method(rhs)
            }
        }
    };
}

impl_scalar_op!(Add, add, |e, k| e.add_constant(k));
impl_scalar_op!(Sub, sub, |e, k| e.add_constant(-k));
impl_scalar_op!(Mul, mul, |e, k| e.scale_in_place(k));
impl_scalar_op!(Div, div, |e, k| e.scale_in_place(1.0 / k));

impl Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        rhs * self
    }
}

impl Mul<&Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: &Expr) -> Expr {
        rhs.scale(self)
    }
}

impl Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        iter.fold(Expr::zero(), |acc, e| acc + e)
    }
}

impl<'a> Sum<&'a Expr> for Expr {
    fn sum<I: Iterator<Item = &'a Expr>>(iter: I) -> Expr {
        iter.fold(Expr::zero(), |acc, e| acc + e)
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::{real, Expr};

    #[test]
    fn test_add_sub() {
        let x = real("x");
        let y = real("y");
        let e = &x + &y - &x;
        assert_eq!(e.linear_coefficient("x"), 0.0);
        assert_eq!(e.linear_coefficient("y"), 1.0);
        assert_eq!(e.variables(), vec!["y"]);
    }

    #[test]
    fn test_scalar_ops() {
        let x = real("x");
        let e = 3.0 * &x / 2.0 + 1.0 - 4.0;
        assert_eq!(e.linear_coefficient("x"), 1.5);
        assert_eq!(e.offset(), -3.0);

        let n = -e;
        assert_eq!(n.linear_coefficient("x"), -1.5);
        assert_eq!(n.offset(), 3.0);
    }

    #[test]
    fn test_sum() {
        let vars = vec![real("a"), real("b"), real("a")];
        let total: Expr = vars.iter().sum();
        assert_eq!(total.linear_coefficient("a"), 2.0);
        assert_eq!(total.linear_coefficient("b"), 1.0);
        assert_eq!(total.declarations().len(), 2);
    }

    #[test]
    fn test_assign_ops() {
        let mut e = real("x");
        e += real("y");
        e -= &real("x");
        assert_eq!(e.variables(), vec!["y"]);

        e -= real("y") * 2.0;
        assert_eq!(e.linear_coefficient("y"), -1.0);
    }
}
