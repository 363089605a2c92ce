use crate::core::engine;
use crate::domain::model::{PlanId, QuoteInput};

pub const MAX_CONTRIBUTION_CHARS: usize = 7;
pub const MAX_AGE_CHARS: usize = 2;

/// Keeps at most `max_chars` characters of `raw`.
pub fn shape_input(raw: &str, max_chars: usize) -> String {
    raw.trim().chars().take(max_chars).collect()
}

/// Values currently typed into the quote form.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteForm {
    aportes: String,
    edad: String,
    plan: PlanId,
}

impl Default for QuoteForm {
    fn default() -> Self {
        Self {
            aportes: String::new(),
            edad: String::new(),
            plan: PlanId::Plan200,
        }
    }
}

impl QuoteForm {
    pub fn new(aportes: &str, edad: &str, plan: PlanId) -> Self {
        let mut form = Self::default();
        form.set_aportes(aportes);
        form.set_edad(edad);
        form.set_plan(plan);
        form
    }

    pub fn set_aportes(&mut self, raw: &str) {
        self.aportes = shape_input(raw, MAX_CONTRIBUTION_CHARS);
    }

    pub fn set_edad(&mut self, raw: &str) {
        self.edad = shape_input(raw, MAX_AGE_CHARS);
    }

    pub fn set_plan(&mut self, plan: PlanId) {
        self.plan = plan;
    }

    pub fn aportes(&self) -> &str {
        &self.aportes
    }

    pub fn edad(&self) -> &str {
        &self.edad
    }

    pub fn plan(&self) -> PlanId {
        self.plan
    }

    pub fn contribution_total(&self) -> f64 {
        engine::contribution_total(&self.aportes)
    }

    pub fn to_input(&self) -> QuoteInput {
        QuoteInput::new(self.aportes.clone(), self.edad.clone(), self.plan)
    }
}
