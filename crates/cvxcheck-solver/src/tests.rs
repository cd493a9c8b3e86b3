// Solver tests against the reference instances

#[cfg(test)]
mod tests {
    use crate::*;
    use cvxcheck_instance::{
        build_instance, Dimensions, RandomSource, ReturnVector, LINEAR_REFERENCE_VALUE,
    };
    use cvxcheck_model::{assemble_problem, ConvexProblem, Objective, Variable};
    use cvxcheck_types::{CheckError, ObjectiveValue, SolveStatus};
    use nalgebra::{DMatrix, DVector};

    fn problem_for(dims: Dimensions, seed: u64) -> ConvexProblem {
        let mut rng = RandomSource::from_seed(seed);
        let instance = build_instance(&dims, &mut rng).unwrap();
        assemble_problem(&instance).unwrap()
    }

    fn backends() -> Vec<Box<dyn SolverBackend>> {
        let settings = SolverSettings::default();
        vec![
            backend_for(SolverChoice::Clarabel, &settings),
            backend_for(SolverChoice::Admm, &settings),
        ]
    }

    fn assert_vec_close(actual: &[f64], expected: &[f64], tol: f64, backend: &str) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            assert!(
                (a - e).abs() < tol,
                "{}: x[{}] = {}, expected {}",
                backend,
                i,
                a,
                e
            );
        }
    }

    #[test]
    fn test_backend_names() {
        let names: Vec<_> = backends().iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["clarabel", "admm"]);
        assert_eq!(SolverChoice::Admm.name(), "admm");
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let settings: SolverSettings = serde_json::from_str(r#"{"max_iter": 50}"#).unwrap();
        assert_eq!(settings.max_iter, 50);
        assert_eq!(settings.eps_abs, SolverSettings::default().eps_abs);

        let choice: SolverChoice = serde_json::from_str(r#""clarabel""#).unwrap();
        assert_eq!(choice, SolverChoice::Clarabel);
    }

    #[test]
    fn test_portfolio_matches_reference_allocation() {
        for returns in [ReturnVector::Mu1, ReturnVector::Mu2] {
            let problem = problem_for(Dimensions::portfolio(returns), 0);
            for backend in backends() {
                let result = backend.solve(&problem).unwrap();
                assert!(result.status.has_solution(), "{}: {:?}", backend.name(), result.status);
                assert_vec_close(
                    result.x.as_ref().unwrap(),
                    &returns.reference_allocation(),
                    1e-3,
                    backend.name(),
                );
            }
        }
    }

    #[test]
    fn test_box_quadratic_solution() {
        let problem = problem_for(Dimensions::BoxQuadratic, 0);
        let expected = [1.0, -1.0 / 3.0, 1.0 / 3.0];

        for backend in backends() {
            let result = backend.solve(&problem).unwrap();
            assert!(result.status.has_solution());
            assert_vec_close(result.x.as_ref().unwrap(), &expected, 1e-4, backend.name());
            assert!(result.dual("sum").is_some());
            assert!(result.dual("x.domain").is_some());
        }
    }

    #[test]
    fn test_range_quadratic_solution_and_duals() {
        let problem = problem_for(Dimensions::RangeQuadratic, 0);

        for backend in backends() {
            let result = backend.solve(&problem).unwrap();
            assert!(result.status.has_solution());
            assert_vec_close(result.x.as_ref().unwrap(), &[0.3, 0.7], 1e-4, backend.name());

            // equality row pulls down, x1 upper bound pushes back
            let y = result.dual("bounds").unwrap();
            assert_vec_close(y, &[-2.9, 0.0, 0.2], 1e-3, backend.name());
        }
    }

    #[test]
    fn test_norm_cone_closed_form() {
        let problem = problem_for(Dimensions::norm_cone(), 0);
        let expected = -(1.0 + 19.0_f64.sqrt());

        let result = ClarabelBackend::new().solve(&problem).unwrap();
        assert_eq!(result.status, SolveStatus::Optimal);

        let value = result.value.value().unwrap();
        assert!((value - expected).abs() < 1e-6, "got {}", value);
        assert!(result.dual("cone").unwrap().len() == 3);
    }

    #[test]
    fn test_least_squares_normal_equations() {
        let mut rng = RandomSource::from_seed(7);
        let instance = build_instance(&Dimensions::least_squares(), &mut rng).unwrap();
        let problem = assemble_problem(&instance).unwrap();

        let (a, b) = match &problem.objective {
            Objective::SumSquares { a, b } => (a.clone(), b.clone()),
            other => panic!("unexpected objective {}", other),
        };
        let reference = (a.transpose() * &a)
            .cholesky()
            .unwrap()
            .solve(&(a.transpose() * &b));
        let best = (&a * &reference - &b).norm_squared();

        for backend in backends() {
            let result = backend.solve(&problem).unwrap();
            let value = result.value.value().unwrap();
            assert!(
                (value - best).abs() < 1e-6 * best.max(1.0),
                "{}: {} vs {}",
                backend.name(),
                value,
                best
            );
        }
    }

    #[test]
    fn test_random_quadratic_duals_are_nonnegative() {
        let problem = problem_for(Dimensions::random_quadratic(), 3);

        for backend in backends() {
            let result = backend.solve(&problem).unwrap();
            assert!(result.status.has_solution(), "{}: {:?}", backend.name(), result.status);

            let x = DVector::from_column_slice(result.x.as_ref().unwrap());
            assert!(problem.max_violation(&x) < 1e-5);

            let y = result.dual("inequalities").unwrap();
            assert_eq!(y.len(), 15);
            assert!(y.iter().all(|&v| v > -1e-6), "{}: {:?}", backend.name(), y);
            assert_eq!(result.dual("equalities").unwrap().len(), 5);
        }
    }

    #[test]
    fn test_random_quadratic_feasible_for_every_seed() {
        let backend = ClarabelBackend::new();
        for seed in 0..20 {
            let problem = problem_for(Dimensions::random_quadratic(), seed);
            let result = backend.solve(&problem).unwrap();
            assert!(result.status.has_solution(), "seed {}: {:?}", seed, result.status);
        }
    }

    #[test]
    fn test_random_socp_with_clarabel() {
        let problem = problem_for(Dimensions::random_socp(), 1);
        let result = ClarabelBackend::new().solve(&problem).unwrap();

        assert_eq!(result.status, SolveStatus::Optimal);
        let x = DVector::from_column_slice(result.x.as_ref().unwrap());
        assert!(problem.max_violation(&x) < 1e-5);
        assert_eq!(result.duals.len(), 4);
    }

    #[test]
    fn test_portfolio_socp_matches_reference_allocation() {
        for returns in [ReturnVector::Mu1, ReturnVector::Mu2] {
            let problem = problem_for(Dimensions::portfolio_socp(returns), 0);
            let result = ClarabelBackend::new().solve(&problem).unwrap();

            assert_eq!(result.status, SolveStatus::Optimal);
            let x = result.x.as_ref().unwrap();
            assert_eq!(x.len(), 9);
            assert_vec_close(&x[..5], &returns.reference_allocation(), 1e-3, "clarabel");
            assert!(result.dual("factor_epigraph").is_some());
        }
    }

    #[test]
    fn test_linear_program_reference_value() {
        let problem = problem_for(Dimensions::Linear, 0);
        let result = ClarabelBackend::new().solve(&problem).unwrap();

        assert_eq!(result.status, SolveStatus::Optimal);
        let value = result.value.value().unwrap();
        assert!(
            (value - LINEAR_REFERENCE_VALUE).abs() < 1e-5,
            "value {} vs {}",
            value,
            LINEAR_REFERENCE_VALUE
        );
        let y = result.dual("inequalities").unwrap();
        assert!(y.iter().all(|&v| v > -1e-6));
    }

    #[test]
    fn test_mpc_on_both_backends() {
        let problem = problem_for(Dimensions::mpc(), 0);
        let mut values = Vec::new();

        for backend in backends() {
            let result = backend.solve(&problem).unwrap();
            assert!(result.status.has_solution(), "{}: {:?}", backend.name(), result.status);

            let z = DVector::from_column_slice(result.x.as_ref().unwrap());
            assert!(problem.max_violation(&z) < 1e-5, "{}", backend.name());
            values.push(result.value.value().unwrap());
        }

        assert!((values[0] - values[1]).abs() < 1e-4 * values[0].abs());
    }

    #[test]
    fn test_admm_rejects_norm_cones() {
        let problem = problem_for(Dimensions::norm_cone(), 0);
        let err = AdmmBackend::new().solve(&problem).unwrap_err();

        match err {
            CheckError::Unsupported(msg) => assert!(msg.contains("'cone'")),
            other => panic!("expected Unsupported, got {:?}", other),
        }
    }

    #[test]
    fn test_contradictory_constraints_report_infeasible() {
        let problem = problem_for(Dimensions::Contradictory { n: 3 }, 0);

        for backend in backends() {
            let result = backend.solve(&problem).unwrap();
            assert_eq!(result.status, SolveStatus::PrimalInfeasible, "{}", backend.name());
            assert_eq!(result.value, ObjectiveValue::Infeasible);
            assert!(result.x.is_none());
        }
    }

    #[test]
    fn test_non_convex_objective_rejected() {
        let problem = ConvexProblem::new(
            Variable::free("x", 3),
            Objective::Quadratic {
                p: DMatrix::from_diagonal(&DVector::from_row_slice(&[-3.0, -2.0, -1.0])),
                q: DVector::zeros(3),
            },
            Vec::new(),
        );

        for backend in backends() {
            let err = backend.solve(&problem).unwrap_err();
            assert!(matches!(err, CheckError::NotConvex(_)), "{}: {:?}", backend.name(), err);
        }
    }

    #[test]
    fn test_check_convex_tolerates_rounding() {
        let mut p = DMatrix::identity(2, 2);
        p[(1, 1)] = -1e-12;
        assert!(check_convex(&p).is_ok());

        p[(1, 1)] = -1e-3;
        assert!(check_convex(&p).is_err());
        assert!(check_convex(&DMatrix::zeros(0, 0)).is_ok());
    }

    #[test]
    fn test_backends_are_shareable_across_threads() {
        let backend: std::sync::Arc<dyn SolverBackend> = std::sync::Arc::new(ClarabelBackend::new());
        let problem = problem_for(Dimensions::BoxQuadratic, 0);

        let handle = {
            let backend = backend.clone();
            let problem = problem.clone();
            std::thread::spawn(move || backend.solve(&problem).map(|r| r.status))
        };
        assert_eq!(handle.join().unwrap().unwrap(), SolveStatus::Optimal);
    }
}
