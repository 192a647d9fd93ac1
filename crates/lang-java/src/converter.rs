use ristretto_classfile::{BaseType, FieldType};

pub struct JavaTypeConverter;

impl JavaTypeConverter {
    /// `com/example/Foo` -> `com.example.Foo`
    pub fn binary_name(internal: &str) -> String {
        internal.replace('/', ".")
    }

    /// `com.example.Foo` -> `com/example/Foo.class`
    pub fn resource_name(binary: &str) -> String {
        format!("{}.class", binary.replace('.', "/"))
    }

    /// Erased type of an annotation descriptor: `Lcom/example/Marker;` -> `com.example.Marker`
    pub fn annotation_type(descriptor: &str) -> Option<String> {
        descriptor
            .strip_prefix('L')
            .and_then(|d| d.strip_suffix(';'))
            .map(Self::binary_name)
    }

    /// Human readable signature, e.g. `run(int, java.lang.String[])`
    pub fn render_method(name: &str, descriptor: &str) -> Result<String, ristretto_classfile::Error> {
        let (params, _) = FieldType::parse_method_descriptor(descriptor)?;
        let rendered: Vec<String> = params.iter().map(Self::render_type).collect();
        Ok(format!("{}({})", name, rendered.join(", ")))
    }

    pub fn render_type(ty: &FieldType) -> String {
        match ty {
            FieldType::Base(BaseType::Byte) => "byte".to_string(),
            FieldType::Base(BaseType::Char) => "char".to_string(),
            FieldType::Base(BaseType::Double) => "double".to_string(),
            FieldType::Base(BaseType::Float) => "float".to_string(),
            FieldType::Base(BaseType::Int) => "int".to_string(),
            FieldType::Base(BaseType::Long) => "long".to_string(),
            FieldType::Base(BaseType::Short) => "short".to_string(),
            FieldType::Base(BaseType::Boolean) => "boolean".to_string(),
            FieldType::Object(name) => Self::binary_name(name),
            FieldType::Array(component) => {
                let mut dimensions = 1usize;
                let mut current = component.as_ref();
                while let FieldType::Array(inner) = current {
                    dimensions += 1;
                    current = inner.as_ref();
                }
                format!("{}{}", Self::render_type(current), "[]".repeat(dimensions))
            }
        }
    }
}
