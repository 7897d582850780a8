#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("life expectancy {life_expectancy} is before current age {current_age}")]
    InvalidHorizon {
        current_age: u32,
        life_expectancy: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_horizon_message_names_both_ages() {
        let err = SimulationError::InvalidHorizon {
            current_age: 70,
            life_expectancy: 65,
        };
        assert_eq!(
            err.to_string(),
            "life expectancy 65 is before current age 70"
        );
    }
}
