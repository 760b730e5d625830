//! Polynomials over GF(256).
//!
//! Coefficients are stored with the highest degree first, so the polynomial
//! `[1, 3, 2]` is x^2 + 3x + 2. Leading zero coefficients are always stripped.
use super::galois::GF;
use crate::error::QrError;

#[cfg(test)]
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<GF>,
}

impl Polynomial {
    /// Create a polynomial from its coefficients and multiply it by x^`shift`.
    ///
    /// An input made only of zeros is the zero polynomial `[0]`, whatever
    /// the shift, so the polynomial is never empty.
    pub fn new(coefficients: &[u8], shift: usize) -> Self {
        let Some(first_nonzero) = coefficients.iter().position(|c| *c != 0) else {
            return Self {
                coefficients: vec![GF(0)],
            };
        };
        let mut coefficients: Vec<GF> = coefficients[first_nonzero..]
            .iter()
            .map(|c| GF(*c))
            .collect();
        coefficients.resize(coefficients.len() + shift, GF(0));
        Self { coefficients }
    }

    fn from_gf(coefficients: Vec<GF>) -> Self {
        let bytes: Vec<u8> = coefficients.into_iter().map(u8::from).collect();
        Self::new(&bytes, 0)
    }

    /// Number of coefficients, which is the degree plus one.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Always false, there is at least one coefficient.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Coefficient at `index`, counted from the highest degree.
    pub fn get(&self, index: usize) -> Option<u8> {
        self.coefficients.get(index).map(|c| c.0)
    }

    /// All coefficients, highest degree first.
    pub fn coefficients(&self) -> impl Iterator<Item = u8> + '_ {
        self.coefficients.iter().map(|c| c.0)
    }

    pub fn multiply(&self, other: &Polynomial) -> Polynomial {
        let mut product = vec![GF(0); self.len() + other.len() - 1];
        for (i, a) in self.coefficients.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coefficients.iter().enumerate() {
                product[i + j] += *a * *b;
            }
        }
        Polynomial::from_gf(product)
    }

    /// Remainder of the division by `divisor`.
    ///
    /// This is long division: while the remainder is at least as long as the
    /// divisor, eliminate its leading coefficient with a multiple of the
    /// divisor. Fails only for a zero divisor.
    pub fn rem(&self, divisor: &Polynomial) -> Result<Polynomial, QrError> {
        let divisor_log = divisor.coefficients[0].log()?;
        let mut remainder = self.clone();
        while remainder.len() >= divisor.len() {
            let leading = remainder.coefficients[0];
            if leading.is_zero() {
                // only the zero polynomial starts with zero
                break;
            }
            let ratio = GF::primitive_power(leading.log()? - divisor_log);
            let mut next = remainder.coefficients.clone();
            for (n, d) in next.iter_mut().zip(&divisor.coefficients) {
                *n += *d * ratio;
            }
            remainder = Polynomial::from_gf(next);
        }
        Ok(remainder)
    }
}

#[test]
fn strips_leading_zeros() {
    let p = Polynomial::new(&[0, 0, 5, 0, 1], 2);
    assert_eq!(p.coefficients().collect::<Vec<_>>(), vec![5, 0, 1, 0, 0]);
    assert_eq!(p.len(), 5);
    assert_eq!(p.get(0), Some(5));
    assert_eq!(p.get(5), None);

    let zero = Polynomial::new(&[0, 0], 0);
    assert_eq!(zero.coefficients().collect::<Vec<_>>(), vec![0]);
    assert!(!zero.is_empty());

    // shifting zero stays zero
    for zero in [Polynomial::new(&[0], 4), Polynomial::new(&[], 2)] {
        assert_eq!(zero.coefficients().collect::<Vec<_>>(), vec![0]);
        assert_eq!(zero.len(), 1);
    }
}

#[test]
fn multiply_linear_factors() {
    // (x + 1)(x + 2) = x^2 + 3x + 2
    let a = Polynomial::new(&[1, 1], 0);
    let b = Polynomial::new(&[1, 2], 0);
    assert_eq!(a.multiply(&b).coefficients().collect::<Vec<_>>(), vec![1, 3, 2]);
}

#[test]
fn remainder_of_multiple_is_zero() {
    let a = Polynomial::new(&[1, 1], 0);
    let b = Polynomial::new(&[1, 2], 0);
    let product = a.multiply(&b);
    let r = product.rem(&b).unwrap();
    assert_eq!(r.coefficients().collect::<Vec<_>>(), vec![0]);
}

#[test]
fn remainder_degree_is_smaller() {
    let p = Polynomial::new(&[7, 200, 13, 99, 1], 3);
    let g = Polynomial::new(&[1, 3, 2], 0);
    let r = p.rem(&g).unwrap();
    assert!(r.len() < g.len());
}

#[test]
fn remainder_by_zero_fails() {
    let p = Polynomial::new(&[1, 2, 3], 0);
    let zero = Polynomial::new(&[0], 0);
    assert_eq!(p.rem(&zero), Err(QrError::LogOfZero));
}
