// CLI command definitions

use super::volume::{DeleteCommand, InspectCommand, ListCommand, ProvisionCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "nodepath-provisioner",
    version,
    about = "Dynamic hostPath volume provisioner for Kubernetes",
    long_about = "Creates and removes node-local directories through short-lived helper pods and records their placement in PersistentVolume node affinity"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create a directory on a node and register it as a PersistentVolume
    Provision(ProvisionCommand),

    /// Remove a provisioned directory (and its PersistentVolume)
    Delete(DeleteCommand),

    /// Show where a volume lives
    Inspect(InspectCommand),

    /// List volumes created by this provisioner
    List(ListCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        let args = CliArgs::try_parse_from([
            "nodepath-provisioner",
            "inspect",
            "--pv-name",
            "pvc-1",
            "-o",
            "json",
        ])
        .unwrap();
        assert!(matches!(args.command, Commands::Inspect(ref cmd) if cmd.pv_name == "pvc-1"));

        let args = CliArgs::try_parse_from([
            "nodepath-provisioner",
            "delete",
            "--pv-name",
            "pvc-1",
            "--force",
            "-n",
            "storage",
        ])
        .unwrap();
        match args.command {
            Commands::Delete(cmd) => {
                assert!(cmd.force);
                assert!(!cmd.keep_volume_object);
                assert_eq!(cmd.cluster.namespace.as_deref(), Some("storage"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_provision_requires_names() {
        assert!(CliArgs::try_parse_from(["nodepath-provisioner", "provision"]).is_err());
    }
}
