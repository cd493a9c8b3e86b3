// Integration tests for problem assembly

#[cfg(test)]
mod tests {
    use crate::*;
    use cvxcheck_instance::{
        build_instance, mpc_data, portfolio_data, Dimensions, RandomSource, ReturnVector,
    };
    use cvxcheck_types::CheckError;
    use nalgebra::{DMatrix, DVector};

    fn assemble(dims: Dimensions) -> ConvexProblem {
        let mut rng = RandomSource::from_seed(1);
        let instance = build_instance(&dims, &mut rng).unwrap();
        assemble_problem(&instance).unwrap()
    }

    #[test]
    fn test_problem_classes() {
        assert_eq!(assemble(Dimensions::least_squares()).class(), ProblemClass::Qp);
        assert_eq!(
            assemble(Dimensions::portfolio(ReturnVector::Mu1)).class(),
            ProblemClass::Qp
        );
        assert_eq!(assemble(Dimensions::norm_cone()).class(), ProblemClass::Socp);
        assert_eq!(assemble(Dimensions::random_socp()).class(), ProblemClass::Socp);
        assert_eq!(
            assemble(Dimensions::portfolio_socp(ReturnVector::Mu1)).class(),
            ProblemClass::Socp
        );
        assert_eq!(assemble(Dimensions::Linear).class(), ProblemClass::Lp);
        assert_eq!(assemble(Dimensions::mpc()).class(), ProblemClass::Qp);
    }

    #[test]
    fn test_portfolio_socp_epigraph_point() {
        let problem = assemble(Dimensions::portfolio_socp(ReturnVector::Mu1));
        let data = portfolio_data(ReturnVector::Mu1);
        let x = DVector::from_row_slice(&ReturnVector::Mu1.reference_allocation());

        // tight epigraph values for the allocation
        let u = data.idiosyncratic.map(f64::sqrt).component_mul(&x).norm();
        let v = (data.factors.transpose() * &x).norm();
        let mut z = x.clone().resize_vertically(9, 0.0);
        z[5] = u * u;
        z[6] = v * v;
        z[7] = u;
        z[8] = v;

        assert!(problem.max_violation(&z) < 1e-6, "{}", problem.max_violation(&z));
        let risk = x.dot(&(&data.factors * data.factors.transpose() * &x))
            + x.dot(&data.idiosyncratic.component_mul(&x));
        let expected = data.gamma * risk - data.mu.dot(&x);
        assert!((problem.evaluate(&z) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_mpc_rollout_satisfies_dynamics() {
        let problem = assemble(Dimensions::mpc());
        let data = mpc_data();
        assert_eq!(problem.num_vars(), 23);
        assert_eq!(problem.num_constraint_rows(), 14 + 2 + 2 + 16 + 7);

        let inputs = [-2.0, 1.5, 0.7, 0.1, -0.1, 0.0, 0.3];
        let mut z = DVector::zeros(23);
        let mut state = data.initial.clone();
        for (t, &u) in inputs.iter().enumerate() {
            z.rows_mut(data.state_offset(t), 2).copy_from(&state);
            z[data.input_offset(7, t)] = u;
            state = &data.dynamics * &state + &data.input * DVector::from_element(1, u);
        }
        z.rows_mut(data.state_offset(7), 2).copy_from(&state);

        let dynamics = problem.constraint("dynamics").unwrap();
        assert!(dynamics.violation(&z) < 1e-12);
        assert!(problem.constraint("initial").unwrap().violation(&z) < 1e-12);
        assert!(problem.constraint("input_limits").unwrap().violation(&z) == 0.0);
        // an arbitrary input sequence does not reach the origin
        assert!(problem.constraint("terminal").unwrap().violation(&z) > 1e-3);
    }

    #[test]
    fn test_random_quadratic_constraint_names() {
        let problem = assemble(Dimensions::random_quadratic());

        assert_eq!(problem.num_vars(), 10);
        assert_eq!(problem.num_constraint_rows(), 20);
        assert!(problem.constraint("inequalities").is_some());
        assert!(problem.constraint("equalities").is_some());
        assert!(problem.constraint("missing").is_none());
    }

    #[test]
    fn test_least_squares_objective_expansion() {
        let problem = assemble(Dimensions::LeastSquares { m: 6, n: 4 });
        let standard = problem.objective.to_standard();

        let x = DVector::from_row_slice(&[0.3, -1.2, 0.7, 2.0]);
        let direct = problem.evaluate(&x);
        let expanded = standard.evaluate(&x);

        assert!((direct - expanded).abs() < 1e-9 * direct.abs().max(1.0));
    }

    #[test]
    fn test_quadratic_expansion_symmetrizes() {
        let objective = Objective::Quadratic {
            p: DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 0.0, 3.0]),
            q: DVector::from_row_slice(&[1.0, -1.0]),
        };
        let standard = objective.to_standard();

        assert_eq!(standard.p, standard.p.transpose());

        let x = DVector::from_row_slice(&[0.5, 2.0]);
        assert!((objective.evaluate(&x) - standard.evaluate(&x)).abs() < 1e-12);
    }

    #[test]
    fn test_violation_measures() {
        let problem = assemble(Dimensions::norm_cone());

        // feasible corner of the region
        let inside = DVector::from_row_slice(&[1.0, 1.0]);
        assert!(problem.max_violation(&inside) < 1e-12);

        // outside the ellipse: 6*4 + 9 = 33 > 25
        let outside = DVector::from_row_slice(&[2.0, 3.0]);
        let cone = problem.constraint("cone").unwrap();
        assert!((cone.violation(&outside) - (33.0_f64.sqrt() - 5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_domain_violation() {
        let var = Variable::new(
            "x",
            3,
            Domain::Box {
                lower: -1.0,
                upper: 1.0,
            },
        );
        let x = DVector::from_row_slice(&[0.0, 1.5, -1.25]);
        assert!((var.domain_violation(&x) - 0.5).abs() < 1e-12);
        assert_eq!(var.domain_constraint_name(), "x.domain");
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let problem = ConvexProblem::new(
            Variable::free("x", 2),
            Objective::Linear {
                c: DVector::from_element(2, 1.0),
            },
            vec![Constraint::inequality(
                "bad",
                DMatrix::identity(3, 3),
                DVector::zeros(3),
            )],
        );
        assert!(matches!(problem.validate(), Err(CheckError::Dimension(_))));

        let problem = ConvexProblem::new(
            Variable::free("x", 2),
            Objective::SumSquares {
                a: DMatrix::identity(3, 2),
                b: DVector::zeros(2),
            },
            Vec::new(),
        );
        assert!(matches!(problem.validate(), Err(CheckError::Dimension(_))));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let row = || DMatrix::from_element(1, 2, 1.0);
        let problem = ConvexProblem::new(
            Variable::free("x", 2),
            Objective::Linear {
                c: DVector::from_element(2, 1.0),
            },
            vec![
                Constraint::equality("c", row(), DVector::from_element(1, 1.0)),
                Constraint::inequality("c", row(), DVector::from_element(1, 2.0)),
            ],
        );
        assert!(matches!(problem.validate(), Err(CheckError::Config(_))));
    }

    #[test]
    fn test_display_lists_constraints() {
        let text = assemble(Dimensions::random_quadratic()).to_string();
        assert!(text.starts_with("Minimize quad_form"));
        assert!(text.contains("inequalities: G x <= h (15 rows)"));
        assert!(text.contains("equalities: A x == b (5 rows)"));

        let text = assemble(Dimensions::least_squares()).to_string();
        assert!(text.ends_with("Unconstrained"));
    }
}
