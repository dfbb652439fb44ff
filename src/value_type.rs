//! Structural tags for action outputs.
//!
//! Two types are interchangeable when they advertise the same content-item
//! class to the host, so equality compares the class identifier rather than
//! the display name.

#[derive(Debug)]
pub struct ValueType {
    pub name: &'static str,
    pub content_item_class: &'static str,
    pub properties: &'static [(&'static str, &'static ValueType)],
}

impl ValueType {
    /// Look up a derived sub-property by its host-visible name.
    pub fn property(&self, name: &str) -> Option<&'static ValueType> {
        self.properties
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, ty)| *ty)
    }
}

impl PartialEq for ValueType {
    fn eq(&self, other: &Self) -> bool {
        self.content_item_class == other.content_item_class
    }
}

impl Eq for ValueType {}

pub static FILE_SIZE: ValueType = ValueType {
    name: "File Size",
    content_item_class: "WFFileSizeContentItem",
    properties: &[],
};

pub static TEXT: ValueType = ValueType {
    name: "Text",
    content_item_class: "WFStringContentItem",
    properties: &[("File Size", &FILE_SIZE)],
};

pub static NUMBER: ValueType = ValueType {
    name: "Number",
    content_item_class: "WFNumberContentItem",
    properties: &[],
};

pub static BOOLEAN: ValueType = ValueType {
    name: "Boolean",
    content_item_class: "WFBooleanContentItem",
    properties: &[],
};

pub static DICTIONARY: ValueType = ValueType {
    name: "Dictionary",
    content_item_class: "WFDictionaryContentItem",
    properties: &[],
};

pub static FILE: ValueType = ValueType {
    name: "File",
    content_item_class: "WFGenericFileContentItem",
    properties: &[("File Size", &FILE_SIZE)],
};

/// Wildcard for outputs with no better description.
pub static ANY: ValueType = ValueType {
    name: "",
    content_item_class: "",
    properties: &[],
};
