use kube::CustomResourceExt;
use toolchain_operator::enabler::ToolChainEnabler;
fn main() {
    print!("{}", serde_yaml::to_string(&ToolChainEnabler::crd()).unwrap());
}
