use crate::SharedIndex;
use prometheus_client::{
    collector::Collector,
    encoding::{DescriptorEncoder, EncodeMetric},
    metrics::{gauge::ConstGauge, MetricType},
    registry::Registry,
};

#[derive(Debug)]
struct Instrumented(SharedIndex);

pub fn register(reg: &mut Registry, index: SharedIndex) {
    reg.register_collector(Box::new(Instrumented(index)));
}

impl Collector for Instrumented {
    fn encode(&self, mut encoder: DescriptorEncoder<'_>) -> Result<(), std::fmt::Error> {
        let this = self.0.read();

        let mut policy_encoder = encoder.encode_descriptor(
            "size",
            "The number of NetworkPolicies in the index",
            None,
            MetricType::Gauge,
        )?;
        for (ns, index) in this.namespaces() {
            let labels = vec![("namespace", ns.as_str())];
            let policies = ConstGauge::new(index.policies.len() as u32);
            let policy_encoder = policy_encoder.encode_family(&labels)?;
            policies.encode(policy_encoder)?;
        }

        Ok(())
    }
}
