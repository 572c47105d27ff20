pub const FILL_DEFAULT: &str = "grey";
pub const FILL_COMPLETED: &str = "green";
pub const FILL_HOVER: &str = "#3C3B6E";
pub const FILL_MISS: &str = "red";
pub const STUDY_STROKE: &str = "#dfdfdf";
pub const STUDY_STROKE_WIDTH: f64 = 0.2;

/// Pointer interaction state of a single rendered feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Hovered,
    Pressed,
}

/// Per-feature quiz facts the fill depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuizMarks {
    pub completed: bool,
    pub current_target: bool,
}

/// Fill for a feature on the quiz map. Pressing the current target flashes
/// green, pressing anything else flashes red.
pub fn quiz_fill(marks: QuizMarks, interaction: Interaction) -> &'static str {
    match interaction {
        Interaction::Pressed if marks.current_target => FILL_COMPLETED,
        Interaction::Pressed => FILL_MISS,
        Interaction::Hovered => FILL_HOVER,
        Interaction::Idle if marks.completed => FILL_COMPLETED,
        Interaction::Idle => FILL_DEFAULT,
    }
}

/// Fill for a feature on the study map; pressing keeps the hover colour.
pub fn study_fill(interaction: Interaction) -> &'static str {
    match interaction {
        Interaction::Idle => FILL_DEFAULT,
        Interaction::Hovered | Interaction::Pressed => FILL_HOVER,
    }
}
