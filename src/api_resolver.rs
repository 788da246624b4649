use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::NamespaceResourceScope;
use kube::api::ListParams;
use kube::{Api, Client, Config, Resource};

#[derive(Clone)]
pub struct ApiResolver {
    pub client: Client,
}

impl ApiResolver {
    pub fn try_new(config: Config) -> kube::Result<Self> {
        let client = Client::try_from(config)?;
        Ok(Self { client })
    }

    pub fn namespaced<K>(&self, ns: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), ns)
    }

    /// Pods bound to the node, across all namespaces.
    pub async fn list_pods_on_node(&self, node_name: &str) -> kube::Result<Vec<Pod>> {
        let api: Api<Pod> = Api::all(self.client.clone());
        let params = ListParams::default().fields(&format!("spec.nodeName={node_name}"));
        let pods = api.list(&params).await?;
        Ok(pods.items)
    }
}
