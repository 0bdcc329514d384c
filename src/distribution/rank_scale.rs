//! Equivalence-scale ranking divisors and weight multipliers

use crate::assumptions::EquivalenceScale;
use crate::error::DistResult;
use crate::population::{fields, Scenario};

/// Per-unit ranking divisor and weight multiplier.
///
/// Adults are `XTOT - nu18`. The effective size is floored at one so that
/// units with nobody counted (dependent filers) are treated as singles.
pub fn get_rank_scale(
    scenario: &dyn Scenario,
    ranking: &EquivalenceScale,
    scaling: &EquivalenceScale,
) -> DistResult<(Vec<f64>, Vec<f64>)> {
    ranking.validate("ranking")?;
    scaling.validate("scaling")?;

    let children = scenario.field(fields::CHILDREN)?;
    let total = scenario.field(fields::XTOT)?;

    let mut rank = Vec::with_capacity(children.len());
    let mut scale = Vec::with_capacity(children.len());
    for (&kids, &people) in children.iter().zip(&total) {
        let adults = people - kids;
        rank.push(equivalent_size(ranking, adults, kids));
        scale.push(equivalent_size(scaling, adults, kids));
    }

    Ok((rank, scale))
}

fn equivalent_size(rule: &EquivalenceScale, adults: f64, children: f64) -> f64 {
    let size = 1.0 + rule.w_adult * (adults - 1.0) + rule.w_child * children;
    let size = if size >= 1.0 { size } else { 1.0 };
    size.powf(rule.elast_size)
}
