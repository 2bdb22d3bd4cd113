//! Element and attribute names of the component document grammar.

/// Namespace of the core grammar. Unqualified elements belong to it too.
pub const DEFAULT_NAMESPACE: &str = "urn:blueprint:components";

/// Namespace of `xsi:schemaLocation` hints.
pub const SCHEMA_INSTANCE_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// File name of the built-in DTD, matched against DOCTYPE system ids.
pub const COMPONENTS_DTD: &str = "components.dtd";
/// File name of the built-in XSD, matched against schema location hints.
pub const COMPONENTS_XSD: &str = "components.xsd";

pub const COMPONENTS_ELEMENT: &str = "components";
pub const COMPONENT_ELEMENT: &str = "component";
pub const IMPORT_ELEMENT: &str = "import";
pub const ALIAS_ELEMENT: &str = "alias";
pub const DESCRIPTION_ELEMENT: &str = "description";
pub const PROPERTY_ELEMENT: &str = "property";
pub const VALUE_ELEMENT: &str = "value";

pub const PROFILE_ATTRIBUTE: &str = "profile";
pub const RESOURCE_ATTRIBUTE: &str = "resource";
pub const NAME_ATTRIBUTE: &str = "name";
pub const ALIAS_ATTRIBUTE: &str = "alias";
pub const ID_ATTRIBUTE: &str = "id";
pub const TYPE_ATTRIBUTE: &str = "type";
pub const VALUE_ATTRIBUTE: &str = "value";
pub const REF_ATTRIBUTE: &str = "ref";
pub const ROLE_ATTRIBUTE: &str = "role";
pub const LAZY_INIT_ATTRIBUTE: &str = "lazy-init";
pub const AUTOWIRE_ATTRIBUTE: &str = "autowire";
pub const INIT_METHOD_ATTRIBUTE: &str = "init-method";
pub const DESTROY_METHOD_ATTRIBUTE: &str = "destroy-method";
pub const SCHEMA_LOCATION_ATTRIBUTE: &str = "schemaLocation";

pub const DEFAULT_LAZY_INIT_ATTRIBUTE: &str = "default-lazy-init";
pub const DEFAULT_AUTOWIRE_ATTRIBUTE: &str = "default-autowire";
pub const DEFAULT_INIT_METHOD_ATTRIBUTE: &str = "default-init-method";
pub const DEFAULT_DESTROY_METHOD_ATTRIBUTE: &str = "default-destroy-method";

/// Attribute value meaning "inherit from the enclosing scope".
pub const DEFAULT_VALUE: &str = "default";
