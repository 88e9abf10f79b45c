// PromQL expression tree for derived metrics
//
// Only the formulas that several panels share are built here. Everything else
// stays an opaque string handed to the backend.
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Window functions applied to a range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFunction {
    Increase,
    Deriv,
    LastOverTime,
}

impl RangeFunction {
    fn name(self) -> &'static str {
        match self {
            RangeFunction::Increase => "increase",
            RangeFunction::Deriv => "deriv",
            RangeFunction::LastOverTime => "last_over_time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    /// Instant vector selector, e.g. `{__name__="W_value", entity_id="..."}`.
    Series(String),
    Range {
        function: RangeFunction,
        selector: String,
        window: String,
    },
    Scalar(Box<Expr>),
    Abs(Box<Expr>),
    ClampMin(Box<Expr>, f64),
    ClampMax(Box<Expr>, f64),
    Negate(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// Selector for one Home Assistant entity stored under a unit-named metric.
pub fn selector(metric: &str, entity: &str) -> String {
    format!(r#"{{__name__="{}", entity_id="{}"}}"#, metric, entity)
}

impl Expr {
    pub fn series(metric: &str, entity: &str) -> Self {
        Expr::Series(selector(metric, entity))
    }

    pub fn range(function: RangeFunction, metric: &str, entity: &str, window: &str) -> Self {
        Expr::Range {
            function,
            selector: selector(metric, entity),
            window: window.to_string(),
        }
    }

    pub fn increase(metric: &str, entity: &str, window: &str) -> Self {
        Self::range(RangeFunction::Increase, metric, entity, window)
    }

    pub fn last_over_time(metric: &str, entity: &str, window: &str) -> Self {
        Self::range(RangeFunction::LastOverTime, metric, entity, window)
    }

    pub fn deriv(metric: &str, entity: &str, window: &str) -> Self {
        Self::range(RangeFunction::Deriv, metric, entity, window)
    }

    pub fn scalar(self) -> Self {
        Expr::Scalar(Box::new(self))
    }

    pub fn abs(self) -> Self {
        Expr::Abs(Box::new(self))
    }

    pub fn clamp_min(self, min: f64) -> Self {
        Expr::ClampMin(Box::new(self), min)
    }

    pub fn clamp_max(self, max: f64) -> Self {
        Expr::ClampMax(Box::new(self), max)
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(op, _, _) => op.precedence(),
            Expr::Negate(_) => 3,
            _ => 4,
        }
    }

    /// Evaluate with `samples` giving the (windowed) value of each selector.
    ///
    /// Mirrors the backend's float arithmetic closely enough to check the
    /// derived-metric formulas; `None` when a selector has no sample.
    #[cfg(test)]
    pub(crate) fn evaluate(&self, samples: &dyn Fn(&str) -> Option<f64>) -> Option<f64> {
        match self {
            Expr::Number(n) => Some(*n),
            Expr::Series(selector) => samples(selector),
            Expr::Range { selector, .. } => samples(selector),
            Expr::Scalar(inner) => inner.evaluate(samples),
            Expr::Abs(inner) => inner.evaluate(samples).map(f64::abs),
            Expr::ClampMin(inner, min) => inner.evaluate(samples).map(|v| v.max(*min)),
            Expr::ClampMax(inner, max) => inner.evaluate(samples).map(|v| v.min(*max)),
            Expr::Negate(inner) => inner.evaluate(samples).map(|v| -v),
            Expr::Binary(op, lhs, rhs) => {
                let (l, r) = (lhs.evaluate(samples)?, rhs.evaluate(samples)?);
                Some(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                })
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Series(selector) => f.write_str(selector),
            Expr::Range {
                function,
                selector,
                window,
            } => write!(f, "{}({}[{}])", function.name(), selector, window),
            Expr::Scalar(inner) => write!(f, "scalar({})", inner),
            Expr::Abs(inner) => write!(f, "abs({})", inner),
            Expr::ClampMin(inner, min) => write!(f, "clamp_min({}, {})", inner, min),
            Expr::ClampMax(inner, max) => write!(f, "clamp_max({}, {})", inner, max),
            Expr::Negate(inner) => {
                f.write_str("-")?;
                inner.fmt_operand(f, inner.precedence() < 3)
            }
            Expr::Binary(op, lhs, rhs) => {
                let p = op.precedence();
                lhs.fmt_operand(f, lhs.precedence() < p)?;
                write!(f, " {} ", op.symbol())?;
                // a - (b - c) and a / (b / c) keep their parentheses
                let right_assoc = matches!(op, BinaryOp::Sub | BinaryOp::Div);
                rhs.fmt_operand(
                    f,
                    rhs.precedence() < p || (right_assoc && rhs.precedence() == p),
                )
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Expr::Number(n)
    }
}

macro_rules! binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<T: Into<Expr>> $trait<T> for Expr {
            type Output = Expr;

            fn $method(self, rhs: T) -> Expr {
                Expr::Binary($op, Box::new(self), Box::new(rhs.into()))
            }
        }
    };
}

binary_operator!(Add, add, BinaryOp::Add);
binary_operator!(Sub, sub, BinaryOp::Sub);
binary_operator!(Mul, mul, BinaryOp::Mul);
binary_operator!(Div, div, BinaryOp::Div);

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Negate(Box::new(self))
    }
}

pub const ENERGY_METRIC: &str = "Wh_value";

/// Cumulative energy counters (Wh) of one installation.
#[derive(Debug, Clone, Copy)]
pub struct EnergyMeters<'a> {
    pub grid_buy: &'a str,
    pub grid_sell: &'a str,
    pub production: &'a str,
}

impl EnergyMeters<'_> {
    // scalar() strips the differing entity_id labels so the series can be combined
    fn delta(entity: &str, window: &str) -> Expr {
        Expr::increase(ENERGY_METRIC, entity, window).scalar()
    }

    /// Autarkie: share of consumption not bought from the grid, in percent.
    pub fn self_sufficiency(&self, window: &str) -> Expr {
        let consumption = Self::delta(self.grid_buy, window) + Self::delta(self.production, window)
            - Self::delta(self.grid_sell, window);
        (Expr::from(1.0) - Self::delta(self.grid_buy, window) / consumption.clamp_min(1.0)) * 100.0
    }

    /// Eigenverbrauch: share of production not sold to the grid, in percent.
    pub fn self_consumption(&self, window: &str) -> Expr {
        let production = Self::delta(self.production, window);
        (Expr::from(1.0) - Self::delta(self.grid_sell, window) / production.clamp_min(1.0)) * 100.0
    }

    /// Household consumption over the window in kWh.
    pub fn consumption_kwh(&self, window: &str) -> Expr {
        (Self::delta(self.production, window) + Self::delta(self.grid_buy, window)
            - Self::delta(self.grid_sell, window))
            / 1000.0
    }
}

/// Energy counter increase over the window in kWh.
pub fn energy_kwh(entity: &str, window: &str) -> Expr {
    Expr::increase(ENERGY_METRIC, entity, window) / 1000.0
}

/// Power in kW estimated from the slope of a state-of-charge percentage.
///
/// `deriv` yields %/s; one percent of `capacity_kwh` is `capacity_kwh * 10` Wh,
/// so %/s times `capacity_kwh * 36` is kW.
pub fn derived_power_kw(level_entity: &str, window: &str, capacity_kwh: f64) -> Expr {
    Expr::deriv("%_value", level_entity, window) * (capacity_kwh * 36.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METERS: EnergyMeters<'static> = EnergyMeters {
        grid_buy: "buy",
        grid_sell: "sell",
        production: "prod",
    };

    fn samples(buy: f64, prod: f64, sell: f64) -> impl Fn(&str) -> Option<f64> {
        move |selector: &str| {
            if selector.contains("\"buy\"") {
                Some(buy)
            } else if selector.contains("\"prod\"") {
                Some(prod)
            } else if selector.contains("\"sell\"") {
                Some(sell)
            } else {
                None
            }
        }
    }

    #[test]
    fn test_self_sufficiency_rendering() {
        let expected = concat!(
            r#"(1 - scalar(increase({__name__="Wh_value", entity_id="buy"}[$__range]))"#,
            r#" / clamp_min(scalar(increase({__name__="Wh_value", entity_id="buy"}[$__range]))"#,
            r#" + scalar(increase({__name__="Wh_value", entity_id="prod"}[$__range]))"#,
            r#" - scalar(increase({__name__="Wh_value", entity_id="sell"}[$__range])), 1)) * 100"#,
        );
        assert_eq!(METERS.self_sufficiency("$__range").to_string(), expected);
    }

    #[test]
    fn test_self_consumption_rendering() {
        let expected = concat!(
            r#"(1 - scalar(increase({__name__="Wh_value", entity_id="sell"}[$__interval]))"#,
            r#" / clamp_min(scalar(increase({__name__="Wh_value", entity_id="prod"}[$__interval])), 1)) * 100"#,
        );
        assert_eq!(METERS.self_consumption("$__interval").to_string(), expected);
    }

    #[test]
    fn test_ratios_are_full_when_idle() {
        let idle = samples(0.0, 0.0, 0.0);
        assert_eq!(METERS.self_sufficiency("$__range").evaluate(&idle), Some(100.0));
        assert_eq!(METERS.self_consumption("$__range").evaluate(&idle), Some(100.0));
    }

    #[test]
    fn test_ratios_with_grid_interaction() {
        // 2 kWh bought, 6 kWh produced, 4 kWh sold: 4 kWh consumed, half from the grid
        let busy = samples(2000.0, 6000.0, 4000.0);
        let sufficiency = METERS.self_sufficiency("1d").evaluate(&busy).unwrap();
        let consumption = METERS.self_consumption("1d").evaluate(&busy).unwrap();
        assert!((sufficiency - 50.0).abs() < 1e-9);
        assert!((consumption - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(METERS.consumption_kwh("1d").evaluate(&busy), Some(4.0));
    }

    #[test]
    fn test_missing_sample() {
        let nothing = |_: &str| -> Option<f64> { None };
        assert_eq!(METERS.self_consumption("1d").evaluate(&nothing), None);
    }

    #[test]
    fn test_derived_power() {
        let expr = derived_power_kw("car_battery_level", "15m", 77.0);
        assert_eq!(
            expr.to_string(),
            r#"deriv({__name__="%_value", entity_id="car_battery_level"}[15m]) * 2772"#
        );
    }

    #[test]
    fn test_operator_parentheses() {
        let a = Expr::series("W_value", "a");
        let b = Expr::series("W_value", "b");
        let c = Expr::series("W_value", "c");

        assert_eq!(
            (a.clone() - (b.clone() - c.clone())).to_string(),
            r#"{__name__="W_value", entity_id="a"} - ({__name__="W_value", entity_id="b"} - {__name__="W_value", entity_id="c"})"#
        );
        assert_eq!(
            ((a.clone() + b.clone()) / 2.0).to_string(),
            r#"({__name__="W_value", entity_id="a"} + {__name__="W_value", entity_id="b"}) / 2"#
        );
        assert_eq!(
            (-c.clamp_max(0.0)).to_string(),
            r#"-clamp_max({__name__="W_value", entity_id="c"}, 0)"#
        );
        assert_eq!(
            a.abs().to_string(),
            r#"abs({__name__="W_value", entity_id="a"})"#
        );
    }
}
