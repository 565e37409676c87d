use anyhow::bail;

use crate::models::{Category, CategoryInputs, ComplianceScore, EvaluationSession};

/// Scores one ICMA category from its inputs. Six categories have no agreed
/// scoring formula yet and come back as `Unsupported` rather than a guessed
/// number.
pub fn score_category(
    category: Category,
    inputs: &CategoryInputs,
) -> anyhow::Result<ComplianceScore> {
    let score = match category {
        Category::EnergyEfficiency => {
            let total = require(inputs.total_energy, "--total-energy")?;
            let baseline = require(inputs.baseline_energy, "--baseline-energy")?;
            if baseline > 0.0 {
                (1.0 - total / baseline) * 100.0
            } else {
                0.0
            }
        }
        Category::WaterManagement => {
            let total = require(inputs.total_water, "--total-water")?;
            let reused = require(inputs.reused_water, "--reused-water")?;
            ratio_pct(reused, total)
        }
        Category::WasteManagement => {
            let total = require(inputs.total_waste, "--total-waste")?;
            let recycled = require(inputs.recycled_waste, "--recycled-waste")?;
            ratio_pct(recycled, total)
        }
        Category::LandReuse => {
            let Some(reuses_land) = inputs.land_reuse else {
                bail!("land reuse requires --land-reuse <true|false>");
            };
            if reuses_land {
                100.0
            } else {
                0.0
            }
        }
        Category::RenewableEnergy => {
            let co2_avoided = require(inputs.co2_avoided, "--co2-avoided")?;
            co2_avoided * 10.0
        }
        Category::CleanTransportation
        | Category::PollutionPrevention
        | Category::GreenBuildings
        | Category::BiodiversityConservation
        | Category::SustainableAgriculture
        | Category::ClimateAdaptation => return Ok(ComplianceScore::Unsupported),
    };

    Ok(ComplianceScore::Scored(score.clamp(0.0, 100.0)))
}

/// Scores the category and records the outcome on the session. Switching
/// categories overwrites the single shared compliance value.
pub fn apply(
    session: &mut EvaluationSession,
    category: Category,
    inputs: &CategoryInputs,
) -> anyhow::Result<ComplianceScore> {
    let score = score_category(category, inputs)?;
    session.record_compliance(score);
    Ok(score)
}

/// Whether the category has an implemented scoring formula.
pub fn is_supported(category: Category) -> bool {
    !matches!(
        category,
        Category::CleanTransportation
            | Category::PollutionPrevention
            | Category::GreenBuildings
            | Category::BiodiversityConservation
            | Category::SustainableAgriculture
            | Category::ClimateAdaptation
    )
}

fn ratio_pct(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

fn require(value: Option<f64>, flag: &str) -> anyhow::Result<f64> {
    match value {
        Some(found) if found >= 0.0 => Ok(found),
        Some(found) => bail!("{flag} must be non-negative, got {found}"),
        None => bail!("this category requires {flag} <value>"),
    }
}
