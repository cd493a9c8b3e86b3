// Integration tests for instance generation

#[cfg(test)]
mod tests {
    use crate::*;
    use cvxcheck_types::CheckError;
    use proptest::prelude::*;

    fn build(dims: &Dimensions, seed: u64) -> ProblemInstance {
        let mut rng = RandomSource::from_seed(seed);
        build_instance(dims, &mut rng).unwrap()
    }

    #[test]
    fn test_least_squares_shapes() {
        match build(&Dimensions::least_squares(), 1) {
            ProblemInstance::LeastSquares { a, b } => {
                assert_eq!(a.shape(), (20, 15));
                assert_eq!(b.len(), 20);
                // Masking zeroes out roughly half the entries
                let zeros = a.iter().filter(|v| **v == 0.0).count();
                assert!(zeros > 50 && zeros < 250, "zeros = {}", zeros);
            }
            other => panic!("unexpected instance {}", other.name()),
        }
    }

    #[test]
    fn test_random_quadratic_shapes_and_psd() {
        match build(&Dimensions::random_quadratic(), 1) {
            ProblemInstance::RandomQuadratic { p, q, g, h, a, b } => {
                assert_eq!(p.shape(), (10, 10));
                assert_eq!(q.len(), 10);
                assert_eq!(g.shape(), (15, 10));
                assert_eq!(h.len(), 15);
                assert_eq!(a.shape(), (5, 10));
                assert_eq!(b.len(), 5);

                let eig = p.clone().symmetric_eigen();
                assert!(eig.eigenvalues.min() > -1e-9);
                assert!((&p - p.transpose()).abs().max() < 1e-12);
            }
            other => panic!("unexpected instance {}", other.name()),
        }
    }

    #[test]
    fn test_random_socp_contains_anchor_point() {
        match build(&Dimensions::random_socp(), 123) {
            ProblemInstance::RandomSocp {
                blocks,
                f,
                g,
                objective,
            } => {
                assert_eq!(blocks.len(), 3);
                assert_eq!(f.shape(), (5, 10));
                assert_eq!(g.len(), 5);
                assert_eq!(objective.len(), 10);
                for block in &blocks {
                    assert_eq!(block.a.shape(), (5, 10));
                    assert_eq!(block.b.len(), 5);
                    assert_eq!(block.c.len(), 10);
                }
            }
            other => panic!("unexpected instance {}", other.name()),
        }
    }

    #[test]
    fn test_fixed_instances_ignore_seed() {
        let a = build(&Dimensions::BoxQuadratic, 1);
        let b = build(&Dimensions::BoxQuadratic, 99);
        assert_eq!(a.coefficient_bytes(), b.coefficient_bytes());

        let a = build(&Dimensions::portfolio(ReturnVector::Mu1), 1);
        let b = build(&Dimensions::portfolio(ReturnVector::Mu2), 1);
        assert_ne!(a.coefficient_bytes(), b.coefficient_bytes());
    }

    #[test]
    fn test_closed_form_only_for_norm_cone() {
        let cone = build(&Dimensions::norm_cone(), 0);
        let expected = -(1.0 + 19.0_f64.sqrt());
        assert!((cone.closed_form_optimum().unwrap() - expected).abs() < 1e-12);

        assert!(build(&Dimensions::BoxQuadratic, 0).closed_form_optimum().is_none());
    }

    #[test]
    fn test_added_fixed_instances() {
        let socp = build(&Dimensions::portfolio_socp(ReturnVector::Mu1), 5);
        assert_eq!(socp.name(), "portfolio_socp");
        assert_eq!(socp.num_variables(), 9);

        let lp = build(&Dimensions::Linear, 5);
        assert_eq!(lp.num_variables(), 10);
        assert_eq!(lp.reference_value(), Some(LINEAR_REFERENCE_VALUE));
        assert!(socp.reference_value().is_none());

        let mpc = build(&Dimensions::mpc(), 5);
        assert_eq!(mpc.num_variables(), 23);
        assert_ne!(
            mpc.coefficient_bytes(),
            build(&Dimensions::Mpc { horizon: 8 }, 5).coefficient_bytes()
        );
        assert!(!Dimensions::mpc().is_random());
    }

    #[test]
    fn test_invalid_dimensions() {
        let mut rng = RandomSource::from_seed(0);

        let err = build_instance(&Dimensions::LeastSquares { m: 0, n: 3 }, &mut rng).unwrap_err();
        assert!(matches!(err, CheckError::Dimension(_)));

        let err = build_instance(&Dimensions::RandomQuadratic { m: 3, n: 2, p: 4 }, &mut rng)
            .unwrap_err();
        assert!(matches!(err, CheckError::Dimension(_)));

        let err = build_instance(
            &Dimensions::NormCone {
                weight: -1.0,
                radius: 5.0,
                lower: 1.0,
            },
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, CheckError::Dimension(_)));

        let err = build_instance(&Dimensions::Mpc { horizon: 0 }, &mut rng).unwrap_err();
        assert!(matches!(err, CheckError::Dimension(_)));
    }

    #[test]
    fn test_dimensions_serde() {
        let dims = Dimensions::RandomQuadratic { m: 4, n: 3, p: 1 };
        let json = serde_json::to_string(&dims).unwrap();
        assert!(json.contains("\"kind\":\"random_quadratic\""));

        let back: Dimensions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dims);

        let portfolio: Dimensions =
            serde_json::from_str(r#"{"kind":"portfolio","returns":"Mu2"}"#).unwrap();
        assert_eq!(portfolio, Dimensions::portfolio(ReturnVector::Mu2));

        let mpc: Dimensions = serde_json::from_str(r#"{"kind":"mpc","horizon":7}"#).unwrap();
        assert_eq!(mpc, Dimensions::mpc());
    }

    proptest! {
        #[test]
        fn prop_same_seed_bit_identical(seed in any::<u64>()) {
            for dims in [
                Dimensions::LeastSquares { m: 6, n: 4 },
                Dimensions::RandomQuadratic { m: 5, n: 4, p: 2 },
                Dimensions::RandomSocp { cones: 2, cone_size: 3, n: 4, p: 1 },
            ] {
                let first = build(&dims, seed).coefficient_bytes();
                let second = build(&dims, seed).coefficient_bytes();
                prop_assert_eq!(first, second);
            }
        }

        #[test]
        fn prop_distinct_seeds_differ(seed in any::<u64>()) {
            let dims = Dimensions::LeastSquares { m: 6, n: 4 };
            let first = build(&dims, seed).coefficient_bytes();
            let second = build(&dims, seed.wrapping_add(1)).coefficient_bytes();
            prop_assert_ne!(first, second);
        }
    }
}
