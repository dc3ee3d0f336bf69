//! # CRD Generator
//!
//! Prints the `AlertChannel` CustomResourceDefinition as YAML.
//!
//! ```bash
//! cargo run -p crds --bin crdgen > config/crd/alertchannel.yaml
//! cargo run -p crds --bin crdgen | kubectl apply -f -
//! ```

use crds::AlertChannel;
use kube::CustomResourceExt;

fn main() {
    let crd = AlertChannel::crd();

    match serde_yaml::to_string(&crd) {
        Ok(yaml) => {
            println!("# This file is auto-generated by crdgen");
            println!("# DO NOT EDIT THIS FILE MANUALLY");
            println!("---");
            print!("{yaml}");
        }
        Err(e) => {
            eprintln!("Failed to serialize CRD to YAML: {e}");
            std::process::exit(1);
        }
    }
}
