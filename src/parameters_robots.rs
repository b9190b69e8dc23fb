//! Hardcoded DH parameters for Universal Robots arms

pub mod dh_kinematics {
    use crate::parameters::dh_kinematics::Parameters;
    use std::f64::consts::PI;

    const UR_ALPHA: [f64; 6] = [PI / 2.0, 0.0, 0.0, PI / 2.0, -PI / 2.0, 0.0];

    impl Parameters {
        // Provides default values
        pub fn new() -> Self {
            Parameters {
                d: [0.0; 6],
                a: [0.0; 6],
                alpha: [0.0; 6],
                offsets: [0.0; 6],
            }
        }

        /// Universal Robots UR10, as used by both arms of the paper handling cell.
        pub fn ur10() -> Self {
            Parameters {
                d: [0.1273, 0.0, 0.0, 0.163941, 0.1157, 0.0922],
                a: [0.0, -0.612, -0.5723, 0.0, 0.0, 0.0],
                alpha: UR_ALPHA,
                ..Self::new()
            }
        }
    }
}
