pub(crate) mod test_utils;

mod generator_scenarios;
mod clearance_scenarios;
