use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Store-wide pricing parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PricingRules {
    pub currency: String,
    /// Fraction of the subtotal charged as tax (IVA), e.g. 0.19
    pub tax_rate: Decimal,
    pub shipping_flat_fee: Decimal,
    /// Subtotal at or above which shipping is free
    pub free_shipping_threshold: Decimal,
}

impl Default for PricingRules {
    fn default() -> Self {
        Self {
            currency: "COP".to_string(),
            tax_rate: Decimal::new(19, 2),
            shipping_flat_fee: Decimal::new(12000, 0),
            free_shipping_threshold: Decimal::new(200000, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Computes order totals from `(unit_price, quantity)` lines
pub fn compute_totals<I>(lines: I, rules: &PricingRules) -> Totals
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    let subtotal: Decimal = lines
        .into_iter()
        .map(|(price, quantity)| price * Decimal::from(quantity))
        .sum();

    if subtotal.is_zero() {
        return Totals {
            subtotal,
            tax: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total: Decimal::ZERO,
        };
    }

    let tax = (subtotal * rules.tax_rate)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let shipping = if subtotal >= rules.free_shipping_threshold {
        Decimal::ZERO
    } else {
        rules.shipping_flat_fee
    };

    Totals {
        subtotal,
        tax,
        shipping,
        total: subtotal + tax + shipping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_pays_shipping() {
        let totals = compute_totals(
            [(Decimal::new(32000, 0), 2), (Decimal::new(15500, 0), 1)],
            &PricingRules::default(),
        );
        assert_eq!(totals.subtotal, Decimal::new(79500, 0));
        assert_eq!(totals.tax, Decimal::new(15105, 0));
        assert_eq!(totals.shipping, Decimal::new(12000, 0));
        assert_eq!(totals.total, Decimal::new(106605, 0));
    }

    #[test]
    fn threshold_grants_free_shipping() {
        let totals = compute_totals([(Decimal::new(100000, 0), 2)], &PricingRules::default());
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::new(238000, 0));
    }

    #[test]
    fn tax_rounds_half_away_from_zero() {
        // 0.05 * 0.10 = 0.005 -> 0.01
        let rules = PricingRules {
            tax_rate: Decimal::new(10, 2),
            ..PricingRules::default()
        };
        let totals = compute_totals([(Decimal::new(5, 2), 1)], &rules);
        assert_eq!(totals.tax, Decimal::new(1, 2));
    }

    #[test]
    fn empty_lines_are_free() {
        let totals = compute_totals(std::iter::empty(), &PricingRules::default());
        assert_eq!(totals.total, Decimal::ZERO);
        assert_eq!(totals.shipping, Decimal::ZERO);
    }
}
