use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// ICMA green-bond project categories. Closed set: the scorer matches
/// exhaustively over these and reports the ones without a formula as
/// unsupported instead of falling through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Category {
    #[strum(serialize = "Renewable energy")]
    RenewableEnergy,
    #[strum(serialize = "Energy efficiency")]
    EnergyEfficiency,
    #[strum(serialize = "Waste management")]
    WasteManagement,
    #[strum(serialize = "Water management")]
    WaterManagement,
    #[strum(serialize = "Land reuse")]
    LandReuse,
    #[strum(serialize = "Clean transportation")]
    CleanTransportation,
    #[strum(serialize = "Pollution prevention")]
    PollutionPrevention,
    #[strum(serialize = "Green buildings")]
    GreenBuildings,
    #[strum(serialize = "Biodiversity conservation")]
    BiodiversityConservation,
    #[strum(serialize = "Sustainable agriculture")]
    SustainableAgriculture,
    #[strum(serialize = "Climate adaptation")]
    ClimateAdaptation,
}

/// Numeric inputs a category formula may need. Only the fields relevant
/// to the selected category are read; the rest stay `None`.
#[derive(Debug, Clone, Default)]
pub struct CategoryInputs {
    pub total_energy: Option<f64>,
    pub baseline_energy: Option<f64>,
    pub total_water: Option<f64>,
    pub reused_water: Option<f64>,
    pub total_waste: Option<f64>,
    pub recycled_waste: Option<f64>,
    pub land_reuse: Option<bool>,
    pub co2_avoided: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ComplianceScore {
    /// Percentage in [0, 100].
    Scored(f64),
    /// The category has no scoring formula yet.
    Unsupported,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FinancialIndicators {
    pub npv: f64,
    pub irr: Option<f64>,
    pub roi: Option<f64>,
    pub payback: Option<usize>,
}

/// Session state carried forward through the evaluation stages. Replaces
/// the ambient per-screen state of the interactive tool: each stage takes
/// the session by `&mut` and overwrites its own fields only.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvaluationSession {
    pub npv: Option<f64>,
    pub irr: Option<f64>,
    pub roi: Option<f64>,
    pub payback: Option<usize>,
    pub compliance: f64,
}

impl EvaluationSession {
    pub fn record_financials(&mut self, indicators: &FinancialIndicators) {
        self.npv = Some(indicators.npv);
        self.irr = indicators.irr;
        self.roi = indicators.roi;
        self.payback = indicators.payback;
    }

    pub fn record_compliance(&mut self, score: ComplianceScore) {
        // An unsupported category leaves the default of zero in place.
        if let ComplianceScore::Scored(value) = score {
            self.compliance = value;
        }
    }

    /// The aggregate verdict is only meaningful when every financial
    /// indicator resolved to a value.
    pub fn financials_complete(&self) -> bool {
        self.npv.is_some() && self.irr.is_some() && self.roi.is_some() && self.payback.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    HighlyViable,
    PotentiallyViable,
    BelowMinimum,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::HighlyViable => "highly viable",
            Verdict::PotentiallyViable => "potentially viable, needs improvement",
            Verdict::BelowMinimum => "does not meet minimum requirements",
        }
    }
}

/// One-row result table written to the export file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub net_present_value: f64,
    pub internal_rate_of_return: f64,
    pub return_on_investment: f64,
    pub payback_period: usize,
    pub compliance_pct: f64,
    pub total_score: f64,
    pub verdict: String,
}

/// One requirement row from the ICMA checklist workbook.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementItem {
    pub indicator: String,
    pub requirement: String,
    pub met: bool,
}
