use kube::runtime::reflector::ObjectRef;
use kube::{Resource, ResourceExt};

/// Unlike [`ObjectRef::from_obj`], doesn't panic on objects that only carry `generateName`.
pub fn get_object_ref<K: Resource>(obj: &K) -> ObjectRef<K>
where
    K::DynamicType: Default,
{
    let object_ref = ObjectRef::new(&obj.name_any());
    match obj.namespace() {
        Some(ns) => object_ref.within(&ns),
        None => object_ref,
    }
}

#[macro_export]
macro_rules! instrumented {
    ($span:expr, $($tt:tt)+) => {{
        use ::tracing::Instrument;

        let span = $span;
        {
            $($tt)*
        }
        .instrument(span)
    }}
}

/// Optional chaining: `try_some!(pod.spec?.volumes?)` is `Option<&Vec<Volume>>`.
#[macro_export]
macro_rules! try_some {
    (@coalesce ($($h:tt)*)) => {
        $($h)*
    };
    (@coalesce ($($h:tt)*) ? $($t:tt)*) => {
        $crate::try_some!(@coalesce ($($h)*.as_ref()?) $($t)*)
    };
    (@coalesce ($($h:tt)*) $m:tt $($t:tt)*) => {
        $crate::try_some!(@coalesce ($($h)* $m) $($t)*)
    };

    ($($tt:tt)*) => {
        {
            fn call<R>(f: impl FnOnce() -> ::std::option::Option<R>) -> ::std::option::Option<R> {
                f()
            }
            call(|| {
                ::std::option::Option::Some($crate::try_some!(@coalesce () $($tt)*))
            })
        }
    };
}
