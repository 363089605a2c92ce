use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flat price attached to the by-contribution plan whenever a new table is installed.
pub const BY_CONTRIBUTION_PRICE: f64 = 9000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlanId {
    #[serde(rename = "200")]
    Plan200,
    #[serde(rename = "300")]
    Plan300,
    #[serde(rename = "400")]
    Plan400,
    #[serde(rename = "500")]
    Plan500,
    #[serde(rename = "POR APORTES")]
    ByContribution,
}

impl PlanId {
    pub const ALL: [PlanId; 5] = [
        PlanId::Plan200,
        PlanId::Plan300,
        PlanId::Plan400,
        PlanId::Plan500,
        PlanId::ByContribution,
    ];

    /// The four numbered tiers, priced by age bracket.
    pub const TIERS: [PlanId; 4] = [
        PlanId::Plan200,
        PlanId::Plan300,
        PlanId::Plan400,
        PlanId::Plan500,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PlanId::Plan200 => "200",
            PlanId::Plan300 => "300",
            PlanId::Plan400 => "400",
            PlanId::Plan500 => "500",
            PlanId::ByContribution => "POR APORTES",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlanId::Plan200 => "Plan 200",
            PlanId::Plan300 => "Plan 300",
            PlanId::Plan400 => "Plan 400",
            PlanId::Plan500 => "Plan 500",
            PlanId::ByContribution => "Plan por Aportes",
        }
    }

    pub fn is_by_contribution(&self) -> bool {
        matches!(self, PlanId::ByContribution)
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlan(pub String);

impl fmt::Display for UnknownPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown plan '{}' (expected 200, 300, 400, 500 or 'POR APORTES')",
            self.0
        )
    }
}

impl std::error::Error for UnknownPlan {}

impl FromStr for PlanId {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "200" | "plan200" | "plan-200" => Ok(PlanId::Plan200),
            "300" | "plan300" | "plan-300" => Ok(PlanId::Plan300),
            "400" | "plan400" | "plan-400" => Ok(PlanId::Plan400),
            "500" | "plan500" | "plan-500" => Ok(PlanId::Plan500),
            "por-aportes" | "aportes" | "plan-por-aportes" => Ok(PlanId::ByContribution),
            _ => Err(UnknownPlan(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "01-29")]
    From1To29,
    #[serde(rename = "30-39")]
    From30To39,
    #[serde(rename = "40-49")]
    From40To49,
    #[serde(rename = "50-59")]
    From50To59,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::From1To29,
        AgeBracket::From30To39,
        AgeBracket::From40To49,
        AgeBracket::From50To59,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AgeBracket::From1To29 => "01-29",
            AgeBracket::From30To39 => "30-39",
            AgeBracket::From40To49 => "40-49",
            AgeBracket::From50To59 => "50-59",
        }
    }

    /// Inclusive bounds of the bracket.
    pub fn bounds(&self) -> (i64, i64) {
        match self {
            AgeBracket::From1To29 => (1, 29),
            AgeBracket::From30To39 => (30, 39),
            AgeBracket::From40To49 => (40, 49),
            AgeBracket::From50To59 => (50, 59),
        }
    }

    pub fn contains(&self, age: i64) -> bool {
        let (low, high) = self.bounds();
        (low..=high).contains(&age)
    }
}

impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Prices of one plan. Tiers use the age slots, the by-contribution plan uses `default`.
/// A missing slot means "no quote available", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPrices {
    #[serde(rename = "01-29", default, skip_serializing_if = "Option::is_none")]
    pub from_1_to_29: Option<f64>,
    #[serde(rename = "30-39", default, skip_serializing_if = "Option::is_none")]
    pub from_30_to_39: Option<f64>,
    #[serde(rename = "40-49", default, skip_serializing_if = "Option::is_none")]
    pub from_40_to_49: Option<f64>,
    #[serde(rename = "50-59", default, skip_serializing_if = "Option::is_none")]
    pub from_50_to_59: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
}

impl PlanPrices {
    pub fn by_age(prices: [f64; 4]) -> Self {
        Self {
            from_1_to_29: Some(prices[0]),
            from_30_to_39: Some(prices[1]),
            from_40_to_49: Some(prices[2]),
            from_50_to_59: Some(prices[3]),
            default: None,
        }
    }

    pub fn flat(price: f64) -> Self {
        Self {
            default: Some(price),
            ..Self::default()
        }
    }

    pub fn price_for(&self, bracket: AgeBracket) -> Option<f64> {
        match bracket {
            AgeBracket::From1To29 => self.from_1_to_29,
            AgeBracket::From30To39 => self.from_30_to_39,
            AgeBracket::From40To49 => self.from_40_to_49,
            AgeBracket::From50To59 => self.from_50_to_59,
        }
    }

    pub fn set_price(&mut self, bracket: AgeBracket, price: Option<f64>) {
        let slot = match bracket {
            AgeBracket::From1To29 => &mut self.from_1_to_29,
            AgeBracket::From30To39 => &mut self.from_30_to_39,
            AgeBracket::From40To49 => &mut self.from_40_to_49,
            AgeBracket::From50To59 => &mut self.from_50_to_59,
        };
        *slot = price;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    #[serde(rename = "200", default, skip_serializing_if = "Option::is_none")]
    pub plan_200: Option<PlanPrices>,
    #[serde(rename = "300", default, skip_serializing_if = "Option::is_none")]
    pub plan_300: Option<PlanPrices>,
    #[serde(rename = "400", default, skip_serializing_if = "Option::is_none")]
    pub plan_400: Option<PlanPrices>,
    #[serde(rename = "500", default, skip_serializing_if = "Option::is_none")]
    pub plan_500: Option<PlanPrices>,
    #[serde(rename = "POR APORTES", default, skip_serializing_if = "Option::is_none")]
    pub by_contribution: Option<PlanPrices>,
}

impl PricingTable {
    /// Built-in table the store starts with when nothing else is configured.
    pub fn builtin() -> Self {
        Self {
            plan_200: Some(PlanPrices::by_age([45_000.0, 52_000.0, 61_000.0, 78_000.0])),
            plan_300: Some(PlanPrices::by_age([55_000.0, 63_000.0, 74_000.0, 95_000.0])),
            plan_400: Some(PlanPrices::by_age([68_000.0, 78_000.0, 92_000.0, 118_000.0])),
            plan_500: Some(PlanPrices::by_age([85_000.0, 97_000.0, 115_000.0, 148_000.0])),
            by_contribution: Some(PlanPrices::flat(BY_CONTRIBUTION_PRICE)),
        }
    }

    pub fn plan(&self, plan: PlanId) -> Option<&PlanPrices> {
        match plan {
            PlanId::Plan200 => self.plan_200.as_ref(),
            PlanId::Plan300 => self.plan_300.as_ref(),
            PlanId::Plan400 => self.plan_400.as_ref(),
            PlanId::Plan500 => self.plan_500.as_ref(),
            PlanId::ByContribution => self.by_contribution.as_ref(),
        }
    }

    pub fn set_plan(&mut self, plan: PlanId, prices: Option<PlanPrices>) {
        let slot = match plan {
            PlanId::Plan200 => &mut self.plan_200,
            PlanId::Plan300 => &mut self.plan_300,
            PlanId::Plan400 => &mut self.plan_400,
            PlanId::Plan500 => &mut self.plan_500,
            PlanId::ByContribution => &mut self.by_contribution,
        };
        *slot = prices;
    }

    pub fn price(&self, plan: PlanId, bracket: AgeBracket) -> Option<f64> {
        self.plan(plan).and_then(|prices| prices.price_for(bracket))
    }

    /// Flat price of the by-contribution plan, if present.
    pub fn by_contribution_price(&self) -> Option<f64> {
        self.by_contribution.as_ref().and_then(|prices| prices.default)
    }

    /// Tier/bracket cells that have no price.
    pub fn missing_cells(&self) -> Vec<(PlanId, AgeBracket)> {
        PlanId::TIERS
            .iter()
            .flat_map(|plan| AgeBracket::ALL.iter().map(move |bracket| (*plan, *bracket)))
            .filter(|(plan, bracket)| self.price(*plan, *bracket).is_none())
            .collect()
    }

    pub fn priced_cells(&self) -> usize {
        PlanId::TIERS.len() * AgeBracket::ALL.len() - self.missing_cells().len()
    }
}

/// Raw form values for one quote, exactly as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteInput {
    pub raw_contribution: String,
    pub raw_age: String,
    pub plan: PlanId,
}

impl QuoteInput {
    pub fn new(raw_contribution: impl Into<String>, raw_age: impl Into<String>, plan: PlanId) -> Self {
        Self {
            raw_contribution: raw_contribution.into(),
            raw_age: raw_age.into(),
            plan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QuoteOutcome {
    AmountToPay(f64),
    FullyCovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("Por favor, ingrese una edad válida.")]
    InvalidAge,
    #[error("La edad ingresada está fuera de los rangos de los planes.")]
    AgeOutOfRange,
    #[error("No se encontró un precio para el plan y edad seleccionados.")]
    PriceNotFound,
}

pub type QuoteResult = std::result::Result<QuoteOutcome, QuoteError>;

/// Image handed to the extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Png,
    Jpeg,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Some(ImageMime::Png),
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub name: String,
    pub mime: ImageMime,
    pub bytes: Vec<u8>,
}
