//! Screen implementations

mod elastic_scaling;
mod kubernetes_dashboard;
mod service_detail;

pub use elastic_scaling::ElasticScalingScreen;
pub use kubernetes_dashboard::KubernetesDashboardScreen;
pub use service_detail::ServiceDetailScreen;
