use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! tag_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }

            pub fn parse(raw: &str) -> Option<Self> {
                match raw {
                    $($tag => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

tag_enum!(
    /// Scrollable regions of the page. `ALL` is the scroll-spy priority order.
    SectionId {
        Home => "home",
        Why => "why",
        HowItWorks => "how-it-works",
        Institutions => "institutions",
        Contact => "contact",
    }
);

tag_enum!(
    FormKind {
        Contact => "contact",
        Collaboration => "collaboration",
    }
);

tag_enum!(
    FormField {
        InstitutionName => "institution_name",
        ContactPerson => "contact_person",
        Email => "email",
        Phone => "phone",
        Message => "message",
    }
);

impl Default for SectionId {
    fn default() -> Self {
        SectionId::Home
    }
}

impl SectionId {
    pub fn nav_label(self) -> &'static str {
        match self {
            SectionId::Home => "Home",
            SectionId::Why => "Why BulandiPe",
            SectionId::HowItWorks => "How It Works",
            SectionId::Institutions => "For Institutions",
            SectionId::Contact => "Contact",
        }
    }
}

const CONTACT_REQUIRED: &[FormField] = &[
    FormField::InstitutionName,
    FormField::ContactPerson,
    FormField::Email,
    FormField::Message,
];

const COLLABORATION_REQUIRED: &[FormField] = &[
    FormField::InstitutionName,
    FormField::ContactPerson,
    FormField::Email,
];

impl FormKind {
    pub fn endpoint_path(self) -> &'static str {
        match self {
            FormKind::Contact => "/api/contact",
            FormKind::Collaboration => "/api/collaboration",
        }
    }

    /// `phone` is never required; `message` only on the contact form.
    pub fn required_fields(self) -> &'static [FormField] {
        match self {
            FormKind::Contact => CONTACT_REQUIRED,
            FormKind::Collaboration => COLLABORATION_REQUIRED,
        }
    }
}

/// Field values of one lead-capture form. Serialized with every key present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormRecord {
    pub institution_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl FormRecord {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::InstitutionName => &self.institution_name,
            FormField::ContactPerson => &self.contact_person,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::Message => &self.message,
        }
    }

    pub fn with_field(&self, field: FormField, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let slot = match field {
            FormField::InstitutionName => &mut next.institution_name,
            FormField::ContactPerson => &mut next.contact_person,
            FormField::Email => &mut next.email,
            FormField::Phone => &mut next.phone,
            FormField::Message => &mut next.message,
        };
        *slot = value.into();
        next
    }

    pub fn is_empty(&self) -> bool {
        FormField::ALL.iter().all(|field| self.get(*field).is_empty())
    }

    /// Required fields holding the empty string. Whitespace counts as a value,
    /// as it does for a native `required` input.
    pub fn missing_required(&self, kind: FormKind) -> Vec<FormField> {
        kind.required_fields()
            .iter()
            .copied()
            .filter(|field| self.get(*field).is_empty())
            .collect()
    }
}
