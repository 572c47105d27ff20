/// Study mode: whichever unit is under the pointer is revealed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyState {
    selected: Option<String>,
    message: String,
}

impl StudyState {
    pub fn new(unit_type: &str) -> Self {
        Self {
            selected: None,
            message: format!("Please select any {unit_type} to reveal its name"),
        }
    }

    /// No validation against the registry; an unknown id just displays as-is.
    pub fn select(&mut self, unit: impl Into<String>) {
        self.selected = Some(unit.into());
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Panel line such as `County: Kent`; the name part is blank when nothing is hovered.
    pub fn label(&self, unit_type: &str) -> String {
        format!(
            "{}: {}",
            capitalize(unit_type),
            self.selected.as_deref().unwrap_or_default()
        )
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::StudyState;

    #[test]
    fn select_then_clear() {
        let mut study = StudyState::new("county");
        assert_eq!(study.selected(), None);

        study.select("Kent");
        assert_eq!(study.selected(), Some("Kent"));

        study.select("Devon");
        assert_eq!(study.selected(), Some("Devon"));

        study.clear();
        assert_eq!(study.selected(), None);
    }

    #[test]
    fn unknown_units_are_accepted() {
        let mut study = StudyState::new("county");
        study.select("Atlantis");
        assert_eq!(study.selected(), Some("Atlantis"));
    }

    #[test]
    fn prompt_and_label_use_unit_type() {
        let mut study = StudyState::new("county");
        assert_eq!(
            study.message(),
            "Please select any county to reveal its name"
        );
        assert_eq!(study.label("county"), "County: ");

        study.select("Rutland");
        assert_eq!(study.label("county"), "County: Rutland");
        assert_eq!(study.label(""), ": Rutland");
    }
}
