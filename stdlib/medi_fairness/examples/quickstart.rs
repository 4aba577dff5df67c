use medi_fairness::{
    epsilon, global_disparity, subgroup_rates, Disparity, FairnessConfig, Rate, SampleSet,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let samples = SampleSet::from_binary(
        &[1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
        &[1, 1, 1, 0, 1, 0, 1, 0, 1, 1],
    )?
    .with_attribute("group", ["A", "A", "A", "A", "B", "B", "B", "B", "A", "B"])?
    .with_attribute("level", [1, 2, 1, 2, 1, 1, 2, 2, 1, 2])?;

    let config = FairnessConfig::default();

    let accuracies = subgroup_rates(&samples, &Rate::Accuracy, &config)?;
    for entry in &accuracies.entries {
        println!("{:<6} n={} accuracy={:?}", entry.label, entry.size, entry.rate);
    }

    let report = epsilon(&samples, &Rate::Accuracy, &config)?;
    println!("epsilon = {:?}, exp(epsilon) = {:?}", report.epsilon, report.exp_epsilon);

    for rate in [Rate::Tpr, Rate::Fpr, Rate::FalseOmission, Rate::FalseDiscovery] {
        let diff = global_disparity(&samples, &rate, Disparity::Difference, &config)?;
        println!("{rate} max-min = {diff:?}");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
