mod common;

use classindex::{BuildPolicy, DottedName, IndexBuilder};
use common::*;

#[test]
fn duplicate_class_is_error_in_strict_mode_and_last_write_wins_in_lenient_mode() {
    let bytes_v1 = ClassFileBuilder::new("pkg/Dup").build();

    let mut builder_v2 = ClassFileBuilder::new("pkg/Dup");
    builder_v2.fields.push(Member::new("extra", "I"));
    let bytes_v2 = builder_v2.build();

    let mut strict = IndexBuilder::new(BuildPolicy::Strict);
    strict.append(&bytes_v1).unwrap();
    assert!(strict.append(&bytes_v2).is_err());

    let mut lenient = IndexBuilder::new(BuildPolicy::LenientSkip);
    lenient.append(&bytes_v1).unwrap();
    lenient.append(&bytes_v2).unwrap();
    assert_eq!(lenient.replaced_count(), 1);

    let index = lenient.build();
    let name = DottedName::simple("pkg.Dup");
    let class = index.get_class_by_name(&name).unwrap();
    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.fields[0].name, "extra");
}

#[test]
fn subclass_and_implementor_edges_are_recorded_from_super_and_interfaces() {
    let mut builder = ClassFileBuilder::new("pkg/A");
    builder.super_class = Some("pkg/B".to_string());
    builder.interfaces = vec!["pkg/I".to_string()];
    let bytes = builder.build();

    let mut index_builder = IndexBuilder::new(BuildPolicy::Strict);
    index_builder.append(&bytes).unwrap();
    let index = index_builder.build();

    let super_name = DottedName::simple("pkg.B");
    let subclasses = index.get_known_direct_subclasses(&super_name);
    assert_eq!(subclasses.len(), 1);
    assert_eq!(subclasses[0].name.as_str(), "pkg.A");

    let interface_name = DottedName::simple("pkg.I");
    let implementors = index.get_known_direct_implementors(&interface_name);
    assert_eq!(implementors.len(), 1);
    assert_eq!(implementors[0].name.as_str(), "pkg.A");
}

#[test]
fn an_interface_extending_another_interface_is_recorded_as_an_implementor_edge() {
    // pkg.I1 `extends` pkg.I2 — at the class-file level that is just an
    // entry in I1's interfaces table, indistinguishable from `implements`.
    let mut builder = ClassFileBuilder::new("pkg/I1");
    builder.access_flags = 0x0600; // ACC_INTERFACE | ACC_ABSTRACT
    builder.interfaces = vec!["pkg/I2".to_string()];
    let bytes = builder.build();

    let mut index_builder = IndexBuilder::new(BuildPolicy::Strict);
    index_builder.append(&bytes).unwrap();
    let index = index_builder.build();

    let i2 = DottedName::simple("pkg.I2");
    assert_eq!(index.get_known_direct_implementors(&i2).len(), 1);
    assert!(index.get_known_direct_subclasses(&i2).is_empty());
}

#[test]
fn annotation_lookup_spans_multiple_class_files() {
    let mut a = ClassFileBuilder::new("pkg/A");
    let ann_a = annotation_bytes(&mut a.cp, "pkg/Ann", vec![]);
    a.class_attributes
        .push(runtime_visible_annotations_attr(vec![ann_a]));
    let bytes_a = a.build();

    let mut b = ClassFileBuilder::new("pkg/B");
    let ann_b = annotation_bytes(&mut b.cp, "pkg/Ann", vec![]);
    b.class_attributes
        .push(runtime_visible_annotations_attr(vec![ann_b]));
    let bytes_b = b.build();

    let mut index_builder = IndexBuilder::new(BuildPolicy::Strict);
    index_builder.append(&bytes_a).unwrap();
    index_builder.append(&bytes_b).unwrap();
    let index = index_builder.build();

    let annotation_name = DottedName::simple("pkg.Ann");
    assert_eq!(index.get_annotations(&annotation_name).len(), 2);
}
