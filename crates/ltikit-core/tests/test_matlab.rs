//! MATLAB-style Call Tests
//!
//! Arity dispatch of `margin` and `dcgain`, and the `c2d` / `damp`
//! wrappers.

use approx::assert_relative_eq;
use ltikit_core::lti::Lti;
use ltikit_core::matlab::{
    c2d, damp, dcgain, margin, ss, ss2tf, tf, tf2ss, tfdata, zpk, MatlabArg,
};
use ltikit_core::ControlError;
use ndarray::array;
use num_complex::Complex64;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// margin
// ============================================================================

#[test]
fn test_margin_single_model() {
    init();
    let sys = tf(&[1.0], &[1.0, 2.0, 1.0, 0.0], None).unwrap();
    let (gm, pm, wcg, wcp) = margin(&[MatlabArg::from(sys)]).unwrap();
    assert_relative_eq!(gm, 2.0, max_relative = 1e-4);
    assert_relative_eq!(pm, 21.386, epsilon = 1e-2);
    assert_relative_eq!(wcg, 0.682328, max_relative = 1e-4);
    assert_relative_eq!(wcp, 1.0, max_relative = 1e-4);
}

#[test]
fn test_margin_two_arguments_rejected() {
    let sys: MatlabArg = tf(&[1.0], &[1.0, 2.0, 1.0, 0.0], None).unwrap().into();
    let args = [sys.clone(), sys];
    match margin(&args) {
        Err(ControlError::InvalidArgument(msg)) => {
            assert_eq!(msg, "margin needs 1 or 3 arguments; received 2")
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_margin_three_arrays() {
    let args: [MatlabArg; 3] = [
        vec![0.2, 0.2, 0.5, 0.5].into(),
        vec![-170.0, -190.0, -190.0, -170.0].into(),
        vec![1.0, 2.0, 3.0, 4.0].into(),
    ];
    let (gm, _, _, wcp) = margin(&args).unwrap();
    assert_relative_eq!(gm, 2.0, epsilon = 1e-12);
    assert_relative_eq!(wcp, 3.5, epsilon = 1e-12);
}

#[test]
fn test_margin_arrays_of_unequal_length() {
    let args: [MatlabArg; 3] = [
        vec![0.2, 0.2].into(),
        vec![-170.0, -190.0, -190.0].into(),
        vec![1.0, 2.0, 3.0].into(),
    ];
    assert!(matches!(margin(&args), Err(ControlError::InvalidArgument(_))));
}

// ============================================================================
// dcgain
// ============================================================================

#[test]
fn test_dcgain_every_arity() {
    let expected = 1.0 / 2.0 + 1.0 / 3.0;

    let abcd: [MatlabArg; 4] = [
        array![[-2.0, 0.0], [0.0, -3.0]].into(),
        array![[1.0], [1.0]].into(),
        array![[1.0, 1.0]].into(),
        array![[0.0]].into(),
    ];
    assert_relative_eq!(dcgain(&abcd).unwrap()[[0, 0]], expected, epsilon = 1e-12);

    let zpk_args: [MatlabArg; 3] = [
        vec![Complex64::new(-2.5, 0.0)].into(),
        vec![Complex64::new(-2.0, 0.0), Complex64::new(-3.0, 0.0)].into(),
        2.0.into(),
    ];
    assert_relative_eq!(dcgain(&zpk_args).unwrap()[[0, 0]], expected, epsilon = 1e-10);

    let tf_args: [MatlabArg; 2] = [vec![2.0, 5.0].into(), vec![1.0, 5.0, 6.0].into()];
    assert_relative_eq!(dcgain(&tf_args).unwrap()[[0, 0]], expected, epsilon = 1e-12);

    let model = ss(
        array![[-2.0, 0.0], [0.0, -3.0]],
        array![[1.0], [1.0]],
        array![[1.0, 1.0]],
        array![[0.0]],
        None,
    )
    .unwrap();
    assert_relative_eq!(dcgain(&[MatlabArg::from(model)]).unwrap()[[0, 0]], expected, epsilon = 1e-12);
}

#[test]
fn test_dcgain_five_arguments_rejected() {
    let args: Vec<MatlabArg> = (0..5).map(|k| MatlabArg::Scalar(k as f64)).collect();
    match dcgain(&args) {
        Err(ControlError::InvalidArgument(msg)) => assert!(msg.contains("received 5")),
        other => panic!("unexpected {:?}", other),
    }
}

// ============================================================================
// Conversions, c2d and damp
// ============================================================================

#[test]
fn test_ss2tf_and_tfdata() {
    let sys: Lti = ss(
        array![[-2.0, 0.0], [0.0, -3.0]],
        array![[1.0], [1.0]],
        array![[1.0, 1.0]],
        array![[0.0]],
        None,
    )
    .unwrap()
    .into();
    let tf_sys = ss2tf(&sys).unwrap();
    assert_relative_eq!(tf_sys.num(0, 0)[0], 2.0, epsilon = 1e-10);

    let (num, den) = tfdata(&sys).unwrap();
    assert_eq!(num.len(), 1);
    assert_eq!(den[0][0].len(), 3);

    let back = tf2ss(&tf_sys.into()).unwrap();
    assert_eq!(back.nstates(), 2);
}

#[test]
fn test_c2d_state_space_input_coerced_back() {
    init();
    let sys: Lti = ss(array![[-1.0]], array![[1.0]], array![[1.0]], array![[0.0]], None)
        .unwrap()
        .into();
    for method in ["zoh", "tustin", "bilinear", "matched"] {
        let d = c2d(&sys, 0.1, method).unwrap();
        assert!(matches!(d, Lti::StateSpace(_)), "{}", method);
    }
}

#[test]
fn test_c2d_discrete_timebase() {
    let sys: Lti = zpk(&[], &[Complex64::new(-1.0, 0.0)], 1.0, None).unwrap().into();
    let d = c2d(&sys, 0.25, "zoh").unwrap();
    use ltikit_core::lti::LtiSystem;
    assert_eq!(d.timebase().dt(), Some(0.25));
}

#[test]
fn test_damp_wrapper() {
    let sys: Lti = tf(&[1.0], &[1.0, 4.0], None).unwrap().into();
    let d = damp(&sys).unwrap();
    assert_eq!(d.wn, vec![4.0]);
    assert_eq!(d.zeta, vec![1.0]);
}
