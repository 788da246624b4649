use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;

pub fn created_by(kind: &str, name: &str) -> String {
    serde_json::json!({
        "kind": "SerializedReference",
        "apiVersion": "v1",
        "reference": {
            "kind": kind,
            "namespace": "default",
            "name": name,
            "apiVersion": "v1",
        },
    })
    .to_string()
}

pub fn pod_from_yaml(yaml: &str) -> Pod {
    serde_yaml::from_str(yaml).expect("Invalid yaml")
}

/// A pod `name` in `default`, created by the `kind` controller `owner`.
pub fn owned_pod(name: &str, kind: &str, owner: &str) -> Pod {
    let mut pod = pod_from_yaml(&format!(
        r#"
metadata:
  name: {name}
  namespace: default
spec:
  nodeName: node
  containers:
  - name: app
    image: public.ecr.aws/docker/library/busybox"#
    ));
    pod.annotations_mut().insert(
        String::from("kubernetes.io/created-by"),
        created_by(kind, owner),
    );
    pod
}

pub fn naked_pod(name: &str) -> Pod {
    pod_from_yaml(&format!(
        r#"
metadata:
  name: {name}
  namespace: default
spec:
  nodeName: node
  containers:
  - name: app
    image: public.ecr.aws/docker/library/busybox"#
    ))
}

pub fn emptydir_pod(name: &str) -> Pod {
    pod_from_yaml(&format!(
        r#"
metadata:
  name: {name}
  namespace: default
spec:
  nodeName: node
  containers:
  - name: app
    image: public.ecr.aws/docker/library/busybox
  volumes:
  - name: scratch
    emptyDir:
      medium: ""
"#
    ))
}

pub fn names<'a>(pods: impl IntoIterator<Item = &'a Pod>) -> Vec<String> {
    pods.into_iter().map(|pod| pod.name_any()).collect()
}
