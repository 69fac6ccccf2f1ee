use serde_json::Value;
use tracing::warn;

use crate::core::types::Properties;
use crate::core::{Library, ReadGroup, Sample, SampleGroup};
use crate::output::shape::ShapePolicy;

/// Project a `SampleGroup` into a document tree laid out by `policy`
#[must_use]
pub fn samplegroup_to_document(group: &SampleGroup, policy: ShapePolicy) -> Value {
    let samples = group
        .iter()
        .map(|sample| sample_node(sample, policy))
        .collect();

    let mut root = Properties::new();
    root.insert("samples".to_string(), Value::Array(samples));
    Value::Object(root)
}

fn sample_node(sample: &Sample, policy: ShapePolicy) -> Value {
    if policy.flatten_libraries {
        let readgroups = sample
            .iter()
            .flat_map(|library| {
                library
                    .iter()
                    .map(move |readgroup| readgroup_node(readgroup, Some(library), policy))
            })
            .collect();
        return node(
            &sample.id,
            "readgroups",
            readgroups,
            &sample.additional_properties,
            policy,
        );
    }

    let libraries = sample
        .iter()
        .map(|library| library_node(library, policy))
        .collect();
    node(
        &sample.id,
        "libraries",
        libraries,
        &sample.additional_properties,
        policy,
    )
}

fn library_node(library: &Library, policy: ShapePolicy) -> Value {
    let readgroups = library
        .iter()
        .map(|readgroup| readgroup_node(readgroup, None, policy))
        .collect();
    node(
        &library.id,
        "readgroups",
        readgroups,
        &library.additional_properties,
        policy,
    )
}

/// A readgroup record; `library` is given only when the library level is flattened
fn readgroup_node(readgroup: &ReadGroup, library: Option<&Library>, policy: ShapePolicy) -> Value {
    let mut fields = Properties::new();

    if let Some(library) = library {
        fields.insert("id".to_string(), Value::String(readgroup.id.clone()));
        fields.insert("lib_id".to_string(), Value::String(library.id.clone()));
        insert_reads(&mut fields, readgroup);
    } else {
        let mut reads = Properties::new();
        insert_reads(&mut reads, readgroup);
        if policy.id_first {
            fields.insert("id".to_string(), Value::String(readgroup.id.clone()));
            fields.insert("reads".to_string(), Value::Object(reads));
        } else {
            fields.insert("reads".to_string(), Value::Object(reads));
            fields.insert("id".to_string(), Value::String(readgroup.id.clone()));
        }
    }

    merge_extras(&mut fields, &readgroup.additional_properties, &readgroup.id);
    Value::Object(fields)
}

/// R1 always, the rest only when present
fn insert_reads(target: &mut Properties, readgroup: &ReadGroup) {
    target.insert(
        "R1".to_string(),
        Value::String(readgroup.r1.to_string_lossy().into_owned()),
    );
    if let Some(md5) = &readgroup.r1_md5 {
        target.insert("R1_md5".to_string(), Value::String(md5.clone()));
    }
    if let Some(r2) = &readgroup.r2 {
        target.insert(
            "R2".to_string(),
            Value::String(r2.to_string_lossy().into_owned()),
        );
    }
    if let Some(md5) = &readgroup.r2_md5 {
        target.insert("R2_md5".to_string(), Value::String(md5.clone()));
    }
}

fn node(
    id: &str,
    children_key: &str,
    children: Vec<Value>,
    extras: &Properties,
    policy: ShapePolicy,
) -> Value {
    let mut fields = Properties::new();
    if policy.id_first {
        fields.insert("id".to_string(), Value::String(id.to_string()));
        fields.insert(children_key.to_string(), Value::Array(children));
    } else {
        fields.insert(children_key.to_string(), Value::Array(children));
        fields.insert("id".to_string(), Value::String(id.to_string()));
    }
    merge_extras(&mut fields, extras, id);
    Value::Object(fields)
}

/// Append extra properties after the fixed keys; fixed keys win on collision
fn merge_extras(fields: &mut Properties, extras: &Properties, id: &str) {
    for (key, value) in extras {
        if fields.contains_key(key) {
            warn!(
                "Dropping extra property '{}' of '{}': it collides with a fixed key",
                key, id
            );
            continue;
        }
        fields.insert(key.clone(), value.clone());
    }
}
