//! Compute API: virtual machines and their extensions

use async_trait::async_trait;
use tracing::info;

use crate::client::ManagementClient;
use crate::error::Result;
use crate::models::{OperationResponse, VirtualMachine, VirtualMachineExtension};

/// Compute operations used by the VM commands
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Fetch a virtual machine
    async fn get_virtual_machine(&self, resource_group: &str, vm_name: &str)
        -> Result<VirtualMachine>;

    /// Create or update an extension and wait for provisioning to finish
    ///
    /// A provisioning failure reported by the operation status endpoint is
    /// returned as a structured remote error.
    async fn create_or_update_extension(
        &self,
        resource_group: &str,
        vm_name: &str,
        extension_name: &str,
        extension: &VirtualMachineExtension,
    ) -> Result<OperationResponse<VirtualMachineExtension>>;
}

impl ManagementClient {
    fn virtual_machine_segments<'a>(
        subscription: &'a str,
        resource_group: &'a str,
        vm_name: &'a str,
    ) -> Vec<&'a str> {
        vec![
            "subscriptions",
            subscription,
            "resourceGroups",
            resource_group,
            "providers",
            "Microsoft.Compute",
            "virtualMachines",
            vm_name,
        ]
    }
}

#[async_trait]
impl ComputeApi for ManagementClient {
    async fn get_virtual_machine(
        &self,
        resource_group: &str,
        vm_name: &str,
    ) -> Result<VirtualMachine> {
        let segments =
            Self::virtual_machine_segments(self.subscription_id()?, resource_group, vm_name);
        let url = self.management_url(&segments, &self.options().compute_api_version)?;

        let raw = self.send(self.http().get(url)).await?;
        Ok(raw.decode::<VirtualMachine>("virtual machine")?.body)
    }

    async fn create_or_update_extension(
        &self,
        resource_group: &str,
        vm_name: &str,
        extension_name: &str,
        extension: &VirtualMachineExtension,
    ) -> Result<OperationResponse<VirtualMachineExtension>> {
        let mut segments =
            Self::virtual_machine_segments(self.subscription_id()?, resource_group, vm_name);
        segments.extend(["extensions", extension_name]);
        let url = self.management_url(&segments, &self.options().compute_api_version)?;

        info!(vm = vm_name, extension = extension_name, "creating or updating VM extension");
        let initial = self.send(self.http().put(url.clone()).json(extension)).await?;

        if self.await_completion(&initial).await? {
            let finished = self.send(self.http().get(url)).await?;
            return finished.decode("virtual machine extension");
        }
        initial.decode("virtual machine extension")
    }
}
