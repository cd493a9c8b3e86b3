// Tests for shared result and error types

#[cfg(test)]
mod tests {
    use crate::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_status_maps_to_sentinel() {
        assert_eq!(
            ObjectiveValue::from_status(SolveStatus::Optimal, 1.5),
            ObjectiveValue::Optimal(1.5)
        );
        assert_eq!(
            ObjectiveValue::from_status(SolveStatus::PrimalInfeasible, 0.0),
            ObjectiveValue::Infeasible
        );
        assert_eq!(
            ObjectiveValue::from_status(SolveStatus::DualInfeasible, 0.0),
            ObjectiveValue::Unbounded
        );
        assert_eq!(
            ObjectiveValue::from_status(SolveStatus::MaxIterations, 3.0),
            ObjectiveValue::SolverError(SolveStatus::MaxIterations)
        );
    }

    #[test]
    fn test_sentinel_display() {
        assert_eq!(ObjectiveValue::Infeasible.to_string(), "infeasible");
        assert_eq!(ObjectiveValue::Unbounded.to_string(), "unbounded");
        assert_eq!(ObjectiveValue::Optimal(2.5).to_string(), "2.5");
        assert!(ObjectiveValue::Infeasible.value().is_none());
    }

    #[test]
    fn test_result_without_solution() {
        let result = SolveResult::without_solution(SolveStatus::PrimalInfeasible, 12, "admm");

        assert!(result.x.is_none());
        assert!(result.value.is_infeasible());
        assert!(result.duals.is_empty());
        assert_eq!(result.iterations, 12);
        assert!(!result.status.has_solution());
    }

    #[test]
    fn test_result_serialization() {
        let mut duals = BTreeMap::new();
        duals.insert("inequalities".to_string(), vec![0.0, 1.25]);

        let result = SolveResult {
            status: SolveStatus::Optimal,
            value: ObjectiveValue::Optimal(-4.0),
            x: Some(vec![1.0, 2.0]),
            duals,
            iterations: 8,
            backend: "clarabel".to_string(),
        };

        let json = serde_json::to_string(&result).unwrap();
        let back: SolveResult = serde_json::from_str(&json).unwrap();

        assert_eq!(back.value, result.value);
        assert_eq!(back.dual("inequalities"), Some(&[0.0, 1.25][..]));
        assert_eq!(back.dual("missing"), None);
    }

    #[test]
    fn test_error_messages() {
        let err = CheckError::Dimension("A must be 3x2, got 2x2".to_string());
        assert_eq!(err.to_string(), "Dimension mismatch: A must be 3x2, got 2x2");

        let io: CheckError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, CheckError::Io(_)));
    }
}
