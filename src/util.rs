pub fn mean(data: &[u64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<u64>() as f64 / count as f64),
    }
}

pub fn std_dev(data: &[u64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value as f64;

            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}
