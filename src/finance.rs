use crate::models::{EvaluationSession, FinancialIndicators};

const NEWTON_MAX_ITERATIONS: usize = 50;
const BISECTION_MAX_ITERATIONS: usize = 200;
const RATE_LOWER_BOUND: f64 = -0.99;
const RATE_UPPER_BOUND: f64 = 10.0;
const BRACKET_STEP: f64 = 0.01;

pub fn compute_indicators(cash_flows: &[f64], discount_rate: f64) -> FinancialIndicators {
    FinancialIndicators {
        npv: net_present_value(discount_rate, cash_flows),
        irr: internal_rate_of_return(cash_flows),
        roi: return_on_investment(cash_flows),
        payback: payback_period(cash_flows),
    }
}

/// Runs the financial stage and records its outcome on the session.
pub fn analyze(
    session: &mut EvaluationSession,
    cash_flows: &[f64],
    discount_rate: f64,
) -> FinancialIndicators {
    let indicators = compute_indicators(cash_flows, discount_rate);
    session.record_financials(&indicators);
    indicators
}

pub fn net_present_value(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(period, amount)| amount / (1.0 + rate).powi(period as i32))
        .sum()
}

/// Discount rate at which the net present value crosses zero. Newton-Raphson
/// from 10%, falling back to bisection over a bracket scan when the iteration
/// diverges. `None` when the series has no sign change or no root exists in
/// the scanned rate range.
pub fn internal_rate_of_return(cash_flows: &[f64]) -> Option<f64> {
    let has_inflow = cash_flows.iter().any(|amount| *amount > 0.0);
    let has_outflow = cash_flows.iter().any(|amount| *amount < 0.0);
    if !has_inflow || !has_outflow {
        return None;
    }

    let scale = cash_flows
        .iter()
        .fold(1.0f64, |max, amount| max.max(amount.abs()));
    let tolerance = scale * 1e-9;

    if let Some(rate) = newton_irr(cash_flows, tolerance) {
        return Some(rate);
    }

    bisection_irr(cash_flows, tolerance)
}

fn newton_irr(cash_flows: &[f64], tolerance: f64) -> Option<f64> {
    let mut rate = 0.1f64;

    for _ in 0..NEWTON_MAX_ITERATIONS {
        let value = net_present_value(rate, cash_flows);
        if value.abs() < tolerance {
            return Some(rate);
        }

        let slope = npv_slope(rate, cash_flows);
        if slope.abs() < f64::EPSILON {
            return None;
        }

        let next = rate - value / slope;
        if !next.is_finite() || next <= RATE_LOWER_BOUND || next > RATE_UPPER_BOUND {
            return None;
        }
        rate = next;
    }

    None
}

fn bisection_irr(cash_flows: &[f64], tolerance: f64) -> Option<f64> {
    let (mut low, mut high) = bracket_root(cash_flows)?;
    let mut low_value = net_present_value(low, cash_flows);

    for _ in 0..BISECTION_MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let mid_value = net_present_value(mid, cash_flows);

        if mid_value.abs() < tolerance || (high - low) / 2.0 < 1e-10 {
            return Some(mid);
        }

        if (mid_value < 0.0) == (low_value < 0.0) {
            low = mid;
            low_value = mid_value;
        } else {
            high = mid;
        }
    }

    None
}

fn bracket_root(cash_flows: &[f64]) -> Option<(f64, f64)> {
    let mut previous_rate = RATE_LOWER_BOUND;
    let mut previous_value = net_present_value(previous_rate, cash_flows);

    let steps = ((RATE_UPPER_BOUND - RATE_LOWER_BOUND) / BRACKET_STEP) as usize;
    for step in 1..=steps {
        let rate = RATE_LOWER_BOUND + step as f64 * BRACKET_STEP;
        let value = net_present_value(rate, cash_flows);

        if previous_value == 0.0 {
            return Some((previous_rate, rate));
        }
        if (previous_value < 0.0) != (value < 0.0) {
            return Some((previous_rate, rate));
        }

        previous_rate = rate;
        previous_value = value;
    }

    None
}

fn npv_slope(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(period, amount)| -(period as f64) * amount / (1.0 + rate).powi(period as i32 + 1))
        .sum()
}

/// Net gain over the initial outlay, as a percentage of that outlay.
/// `None` when there is no initial outlay to measure against.
pub fn return_on_investment(cash_flows: &[f64]) -> Option<f64> {
    let initial = cash_flows.first()?.abs();
    if initial == 0.0 {
        return None;
    }

    let inflows: f64 = cash_flows.iter().skip(1).sum();
    Some((inflows - initial) * 100.0 / initial)
}

/// First period at which the cumulative cash flow turns non-negative.
pub fn payback_period(cash_flows: &[f64]) -> Option<usize> {
    let mut cumulative = 0.0;
    for (period, amount) in cash_flows.iter().enumerate() {
        cumulative += amount;
        if cumulative >= 0.0 {
            return Some(period);
        }
    }
    None
}
