//! Hand-rolled synthetic class-file byte builder for integration tests.
//!
//! There is no `javac` available to produce real fixtures here, so these
//! tests build minimal, byte-correct class files directly against JVMS §4.

use std::collections::HashMap;

pub struct Cp {
    bytes: Vec<u8>,
    count: u16,
    utf8_index: HashMap<String, u16>,
    class_index: HashMap<String, u16>,
}

impl Cp {
    fn new() -> Self {
        Cp {
            bytes: Vec::new(),
            count: 1,
            utf8_index: HashMap::new(),
            class_index: HashMap::new(),
        }
    }

    pub fn add_utf8(&mut self, s: &str) -> u16 {
        if let Some(&idx) = self.utf8_index.get(s) {
            return idx;
        }
        let idx = self.count;
        self.bytes.push(1);
        self.bytes.extend((s.len() as u16).to_be_bytes());
        self.bytes.extend(s.as_bytes());
        self.count += 1;
        self.utf8_index.insert(s.to_string(), idx);
        idx
    }

    pub fn add_integer(&mut self, v: i32) -> u16 {
        let idx = self.count;
        self.bytes.push(3);
        self.bytes.extend(v.to_be_bytes());
        self.count += 1;
        idx
    }

    pub fn add_class(&mut self, internal_name: &str) -> u16 {
        if let Some(&idx) = self.class_index.get(internal_name) {
            return idx;
        }
        let name_idx = self.add_utf8(internal_name);
        let idx = self.count;
        self.bytes.push(7);
        self.bytes.extend(name_idx.to_be_bytes());
        self.count += 1;
        self.class_index.insert(internal_name.to_string(), idx);
        idx
    }
}

pub fn element_int(cp: &mut Cp, v: i32) -> Vec<u8> {
    let idx = cp.add_integer(v);
    let mut b = vec![b'I'];
    b.extend(idx.to_be_bytes());
    b
}

pub fn element_string(cp: &mut Cp, s: &str) -> Vec<u8> {
    let idx = cp.add_utf8(s);
    let mut b = vec![b's'];
    b.extend(idx.to_be_bytes());
    b
}

pub fn element_class(cp: &mut Cp, descriptor: &str) -> Vec<u8> {
    let idx = cp.add_utf8(descriptor);
    let mut b = vec![b'c'];
    b.extend(idx.to_be_bytes());
    b
}

pub fn element_array(elements: Vec<Vec<u8>>) -> Vec<u8> {
    let mut b = vec![b'['];
    b.extend((elements.len() as u16).to_be_bytes());
    for e in elements {
        b.extend(e);
    }
    b
}

pub fn element_nested(annotation: Vec<u8>) -> Vec<u8> {
    let mut b = vec![b'@'];
    b.extend(annotation);
    b
}

/// Builds the bytes of one `annotation` structure (JVMS §4.7.16.1):
/// `type_index`, `num_element_value_pairs`, then the pairs themselves.
pub fn annotation_bytes(cp: &mut Cp, type_internal_name: &str, pairs: Vec<(&str, Vec<u8>)>) -> Vec<u8> {
    let type_descriptor = format!("L{type_internal_name};");
    let type_idx = cp.add_utf8(&type_descriptor);
    let mut b = Vec::new();
    b.extend(type_idx.to_be_bytes());
    b.extend((pairs.len() as u16).to_be_bytes());
    for (name, value_bytes) in pairs {
        let name_idx = cp.add_utf8(name);
        b.extend(name_idx.to_be_bytes());
        b.extend(value_bytes);
    }
    b
}

pub fn runtime_visible_annotations_attr(annotations: Vec<Vec<u8>>) -> (String, Vec<u8>) {
    let mut payload = Vec::new();
    payload.extend((annotations.len() as u16).to_be_bytes());
    for a in annotations {
        payload.extend(a);
    }
    ("RuntimeVisibleAnnotations".to_string(), payload)
}

pub fn runtime_visible_parameter_annotations_attr(
    per_parameter: Vec<Vec<Vec<u8>>>,
) -> (String, Vec<u8>) {
    let mut payload = Vec::new();
    payload.push(per_parameter.len() as u8);
    for parameter_annotations in per_parameter {
        payload.extend((parameter_annotations.len() as u16).to_be_bytes());
        for a in parameter_annotations {
            payload.extend(a);
        }
    }
    ("RuntimeVisibleParameterAnnotations".to_string(), payload)
}

pub struct Member {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<(String, Vec<u8>)>,
}

impl Member {
    pub fn new(name: &str, descriptor: &str) -> Self {
        Member {
            access_flags: 0x0001, // ACC_PUBLIC
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: (String, Vec<u8>)) -> Self {
        self.attributes.push(attribute);
        self
    }
}

fn encode_member(cp: &mut Cp, member: &Member) -> Vec<u8> {
    let mut b = Vec::new();
    b.extend(member.access_flags.to_be_bytes());
    b.extend(cp.add_utf8(&member.name).to_be_bytes());
    b.extend(cp.add_utf8(&member.descriptor).to_be_bytes());
    b.extend((member.attributes.len() as u16).to_be_bytes());
    for (name, payload) in &member.attributes {
        let name_idx = cp.add_utf8(name);
        b.extend(name_idx.to_be_bytes());
        b.extend((payload.len() as u32).to_be_bytes());
        b.extend(payload);
    }
    b
}

pub struct ClassFileBuilder {
    pub cp: Cp,
    pub access_flags: u16,
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<Member>,
    pub methods: Vec<Member>,
    pub class_attributes: Vec<(String, Vec<u8>)>,
}

impl ClassFileBuilder {
    pub fn new(this_class: &str) -> Self {
        ClassFileBuilder {
            cp: Cp::new(),
            access_flags: 0x0021, // ACC_PUBLIC | ACC_SUPER
            this_class: this_class.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            class_attributes: Vec::new(),
        }
    }

    pub fn build(mut self) -> Vec<u8> {
        let this_class_idx = self.cp.add_class(&self.this_class);
        let super_class_idx = self
            .super_class
            .as_ref()
            .map(|s| self.cp.add_class(s))
            .unwrap_or(0);
        let interface_idxs: Vec<u16> = self
            .interfaces
            .iter()
            .map(|i| self.cp.add_class(i))
            .collect();

        let mut fields_bytes = Vec::new();
        for field in &self.fields {
            fields_bytes.extend(encode_member(&mut self.cp, field));
        }

        let mut methods_bytes = Vec::new();
        for method in &self.methods {
            methods_bytes.extend(encode_member(&mut self.cp, method));
        }

        let mut class_attr_bytes = Vec::new();
        for (name, payload) in &self.class_attributes {
            let name_idx = self.cp.add_utf8(name);
            class_attr_bytes.extend(name_idx.to_be_bytes());
            class_attr_bytes.extend((payload.len() as u32).to_be_bytes());
            class_attr_bytes.extend(payload);
        }

        let mut out = Vec::new();
        out.extend(0xCAFE_BABEu32.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(52u16.to_be_bytes());
        out.extend(self.cp.count.to_be_bytes());
        out.extend(&self.cp.bytes);
        out.extend(self.access_flags.to_be_bytes());
        out.extend(this_class_idx.to_be_bytes());
        out.extend(super_class_idx.to_be_bytes());
        out.extend((interface_idxs.len() as u16).to_be_bytes());
        for idx in interface_idxs {
            out.extend(idx.to_be_bytes());
        }
        out.extend((self.fields.len() as u16).to_be_bytes());
        out.extend(&fields_bytes);
        out.extend((self.methods.len() as u16).to_be_bytes());
        out.extend(&methods_bytes);
        out.extend((self.class_attributes.len() as u16).to_be_bytes());
        out.extend(&class_attr_bytes);
        out
    }
}
