//! Defines the Denavit-Hartenberg parameter data structure

pub mod dh_kinematics {
    use crate::utils::deg;

    /// Parameters for the robot. See [parameters_robots.rs](parameters_robots.rs) for concrete robot models.
    /// Standard (distal) Denavit-Hartenberg convention is used: the transform of the link `i` is
    /// `Rz(theta_i) * Tz(d_i) * Tx(a_i) * Rx(alpha_i)`, with `theta_i = q_i + offsets_i`.
    #[derive(Debug, Clone, Copy)]
    pub struct Parameters {
        /// Link offsets along the previous z axis.
        pub d: [f64; 6],

        /// Link lengths along the new x axis.
        pub a: [f64; 6],

        /// Link twists around the new x axis.
        pub alpha: [f64; 6],

        /// Offsets applied to each joint angle to adjust the reference zero position.
        pub offsets: [f64; 6],
    }

    impl Parameters {
        /// Convert to string yaml representation (quick viewing, etc).
        pub fn to_yaml(&self) -> String {
            fn list(values: &[f64; 6]) -> String {
                values.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(", ")
            }
            format!(
                "dh_parameters:\n  \
              d: [{}]\n  \
              a: [{}]\n  \
              alpha: [{}]\n\
            dh_joint_offsets: [{}]\n",
                list(&self.d),
                list(&self.a),
                self.alpha.iter().map(deg).collect::<Vec<_>>().join(", "),
                self.offsets.iter().map(deg).collect::<Vec<_>>().join(", "),
            )
        }
    }
}
