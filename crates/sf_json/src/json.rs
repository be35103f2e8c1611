use alloc::string::String;
use alloc::sync::Arc;

use sf_serial::modules::SerializersModule;
use sf_serial::{DeserializationStrategy, Serializable, SerialResult, SerializationStrategy};

use crate::decoder::StreamingDecoder;
use crate::element::JsonElement;
use crate::encoder::StreamingEncoder;
use crate::lexer::Lexer;
use crate::reader::read_element;
use crate::tree::TreeDecoder;
use crate::{JsonBuilder, JsonConfig};

/// The JSON format: a [`JsonConfig`] and the [`SerializersModule`] used for
/// open polymorphism.
///
/// A `Json` is immutable and cheap to clone. Derive a changed copy with
/// [`Json::builder_from`].
///
/// # Examples
///
/// ```
/// use sf_json::Json;
/// use sf_serial::Serializable;
///
/// #[derive(Serializable, Debug, PartialEq)]
/// #[serial(name = "Project")]
/// struct Project {
///     name: String,
///     #[serial(default)]
///     language: String,
/// }
///
/// let json = Json::default();
/// let project = Project { name: "serial-forge".into(), language: "Rust".into() };
/// let text = json.encode(&project).unwrap();
/// assert_eq!(text, r#"{"name":"serial-forge","language":"Rust"}"#);
/// assert_eq!(json.decode::<Project>(&text).unwrap(), project);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Json {
    config: JsonConfig,
    module: Arc<SerializersModule>,
}

impl Json {
    /// A builder starting from the default configuration.
    #[inline]
    pub fn builder() -> JsonBuilder {
        JsonBuilder::new()
    }

    /// A builder starting from the configuration and module of `json`.
    #[inline]
    pub fn builder_from(json: &Json) -> JsonBuilder {
        JsonBuilder::from_json(json)
    }

    #[inline]
    pub(crate) fn from_parts(config: JsonConfig, module: Arc<SerializersModule>) -> Self {
        Self { config, module }
    }

    #[inline]
    pub fn config(&self) -> &JsonConfig {
        &self.config
    }

    #[inline]
    pub fn module(&self) -> &Arc<SerializersModule> {
        &self.module
    }

    // -------------------------------------------------------------------------
    // Text

    /// Writes `value` as JSON text with `strategy`.
    pub fn encode_to_string<T, S>(&self, strategy: &S, value: &T) -> SerialResult<String>
    where
        T: ?Sized,
        S: SerializationStrategy<T> + ?Sized,
    {
        let mut encoder = StreamingEncoder::new(self);
        strategy.serialize(&mut encoder, value)?;
        Ok(encoder.finish())
    }

    /// Reads one value from `input` with `strategy`.
    ///
    /// The whole input must be consumed: anything but whitespace after the
    /// value is an error.
    pub fn decode_from_string<T, S>(&self, strategy: &S, input: &str) -> SerialResult<T>
    where
        S: DeserializationStrategy<T> + ?Sized,
    {
        let mut decoder = StreamingDecoder::new(self, input);
        let value = strategy.deserialize(&mut decoder)?;
        decoder.lexer.expect_eof()?;
        Ok(value)
    }

    /// Writes `value` with its default serializer.
    #[inline]
    pub fn encode<T: Serializable>(&self, value: &T) -> SerialResult<String> {
        self.encode_to_string(&T::serializer(), value)
    }

    /// Reads a `T` with its default serializer.
    #[inline]
    pub fn decode<T: Serializable>(&self, input: &str) -> SerialResult<T> {
        self.decode_from_string(&T::serializer(), input)
    }

    // -------------------------------------------------------------------------
    // Tree

    /// Parses `input` into a [`JsonElement`] under this configuration.
    pub fn parse_to_json_element(&self, input: &str) -> SerialResult<JsonElement> {
        let mut lexer = Lexer::new(input);
        let element = read_element(&mut lexer, &self.config, false)?;
        lexer.expect_eof()?;
        Ok(element)
    }

    /// Reads a value out of an already parsed tree.
    pub fn decode_from_json_element<T, S>(
        &self,
        strategy: &S,
        element: &JsonElement,
    ) -> SerialResult<T>
    where
        S: DeserializationStrategy<T> + ?Sized,
    {
        let mut decoder = TreeDecoder::new(element, self, "$".into(), false);
        strategy.deserialize(&mut decoder)
    }

    /// Writes `value` into a [`JsonElement`].
    pub fn encode_to_json_element<T, S>(&self, strategy: &S, value: &T) -> SerialResult<JsonElement>
    where
        T: ?Sized,
        S: SerializationStrategy<T> + ?Sized,
    {
        let text = self.encode_to_string(strategy, value)?;
        self.parse_to_json_element(&text)
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use futures_lite::future::block_on;
    use sf_serial::descriptors::SerialDescriptor;
    use sf_serial::encoding::{Decoder, Encoder};
    use sf_serial::modules::{SerialAny, SerializersModule};
    use sf_serial::{Described, DeserializationStrategy, SerializationStrategy};
    use sf_serial::{SerialError, SerialErrorKind, SerialResult, Serializable};
    use sf_serial::{open_polymorphic, recovery};

    use crate::{ClassDiscriminator, Json, JsonElement};

    // -------------------------------------------------------------------------
    // Classes

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(name = "Repo")]
    struct Repo {
        name: String,
        stars: i32,
    }

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(name = "Profile")]
    struct Profile {
        name: String,
        nick: Option<String>,
    }

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(name = "Layout")]
    struct Layout {
        name: String,
        tags: Vec<String>,
        empty: Vec<i32>,
    }

    #[derive(Serializable, Debug, PartialEq, Default, Clone, Copy)]
    #[serial(name = "Color")]
    enum Color {
        #[default]
        Red,
        Green,
    }

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(name = "Settings")]
    struct Settings {
        #[serial(default)]
        level: i32,
        #[serial(default)]
        color: Color,
    }

    #[test]
    fn missing_fields_are_reported() {
        let error = Json::default().decode::<Repo>("{}").unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::MissingField);
        assert_eq!(
            error.message(),
            "Fields [name, stars] are required for type with serial name 'Repo', but they were missing"
        );
    }

    #[test]
    fn unknown_keys() {
        let input = r#"{"name": "sf", "extra": {"a": [1, {}]}, "stars": 3}"#;
        let error = Json::default().decode::<Repo>(input).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::UnknownField);
        assert!(error.message().contains("Encountered an unknown key 'extra'"));
        assert!(error.message().contains("ignore_unknown_keys(true)"));

        let json = Json::builder().ignore_unknown_keys(true).build().unwrap();
        let repo: Repo = json.decode(input).unwrap();
        assert_eq!(repo, Repo { name: "sf".into(), stars: 3 });
    }

    #[test]
    fn lenient_input() {
        let json = Json::builder().lenient(true).build().unwrap();
        let repo: Repo = json.decode(r#"{name: sf, "stars": "3"}"#).unwrap();
        assert_eq!(repo, Repo { name: "sf".into(), stars: 3 });
        assert!(Json::default().decode::<Repo>(r#"{name: "sf", "stars": 3}"#).is_err());
    }

    #[test]
    fn special_floats() {
        let error = Json::default().encode(&f64::NAN).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonEncoding);
        assert!(error.message().contains("allow_special_floating_point_values(true)"));

        let json = Json::builder()
            .allow_special_floating_point_values(true)
            .build()
            .unwrap();
        let text = json.encode(&vec![f64::NAN, f64::NEG_INFINITY, 0.5]).unwrap();
        assert_eq!(text, "[NaN,-Infinity,0.5]");
        assert_eq!(json.encode(&1.0_f32).unwrap(), "1.0");
    }

    #[test]
    fn pretty_printing() {
        let json = Json::builder().pretty_print(true).build().unwrap();
        let layout = Layout {
            name: "x".into(),
            tags: vec!["a".into(), "b".into()],
            empty: Vec::new(),
        };
        let text = json.encode(&layout).unwrap();
        assert_eq!(
            text,
            "{\n    \"name\": \"x\",\n    \"tags\": [\n        \"a\",\n        \"b\"\n    ],\n    \"empty\": []\n}"
        );
        assert_eq!(json.decode::<Layout>(&text).unwrap(), layout);
        assert_eq!(json.encode(&()).unwrap(), "{}");
    }

    #[test]
    fn maps() {
        let json = Json::default();
        let map = BTreeMap::from([(1, String::from("a")), (2, String::from("b"))]);
        let text = json.encode(&map).unwrap();
        assert_eq!(text, r#"{"1":"a","2":"b"}"#);
        assert_eq!(json.decode::<BTreeMap<i32, String>>(&text).unwrap(), map);

        let colors = BTreeMap::from([(String::from("sky"), Color::Green)]);
        assert_eq!(json.encode(&colors).unwrap(), r#"{"sky":"Green"}"#);
    }

    #[test]
    fn structured_map_keys() {
        let map = BTreeMap::from([(vec![1, 2], 3)]);
        let error = Json::default().encode(&map).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonEncoding);

        let json = Json::builder().allow_structured_map_keys(true).build().unwrap();
        let text = json.encode(&map).unwrap();
        assert_eq!(text, "[[1,2],3]");
        assert_eq!(json.decode::<BTreeMap<Vec<i32>, i32>>(&text).unwrap(), map);
    }

    #[test]
    fn explicit_nulls() {
        let profile = Profile { name: "x".into(), nick: None };
        let json = Json::default();
        assert_eq!(json.encode(&profile).unwrap(), r#"{"name":"x","nick":null}"#);
        let error = json.decode::<Profile>(r#"{"name":"x"}"#).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::MissingField);

        let json = Json::builder().explicit_nulls(false).build().unwrap();
        assert_eq!(json.encode(&profile).unwrap(), r#"{"name":"x"}"#);
        assert_eq!(json.decode::<Profile>(r#"{"name":"x"}"#).unwrap(), profile);

        let element = json.parse_to_json_element(r#"{"name":"x"}"#).unwrap();
        let decoded: Profile = json
            .decode_from_json_element(&Profile::serializer(), &element)
            .unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn defaults() {
        let settings = Settings { level: 0, color: Color::Green };
        assert_eq!(Json::default().encode(&settings).unwrap(), r#"{"color":"Green"}"#);

        let json = Json::builder().encode_defaults(true).build().unwrap();
        assert_eq!(json.encode(&settings).unwrap(), r#"{"level":0,"color":"Green"}"#);
    }

    #[test]
    fn coerced_input_values() {
        let input = r#"{"level": null, "color": "Purple"}"#;
        assert!(Json::default().decode::<Settings>(input).is_err());

        let json = Json::builder().coerce_input_values(true).build().unwrap();
        let expected = Settings { level: 0, color: Color::Red };
        assert_eq!(json.decode::<Settings>(input).unwrap(), expected);
        let element = json.parse_to_json_element(input).unwrap();
        let decoded: Settings = json
            .decode_from_json_element(&Settings::serializer(), &element)
            .unwrap();
        assert_eq!(decoded, expected);
        assert_eq!(
            json.decode::<Settings>(r#"{"color": "Green"}"#).unwrap().color,
            Color::Green
        );
    }

    #[test]
    fn trailing_commas() {
        let error = Json::default().decode::<Vec<i32>>("[1, 2,]").unwrap_err();
        assert!(error.message().contains("allow_trailing_comma(true)"));
        assert!(Json::default().decode::<Vec<i32>>("[1,, 2]").is_err());

        let json = Json::builder().allow_trailing_comma(true).build().unwrap();
        assert_eq!(json.decode::<Vec<i32>>("[1, 2,]").unwrap(), [1, 2]);
        let repo: Repo = json.decode(r#"{"name": "sf", "stars": 1,}"#).unwrap();
        assert_eq!(repo.stars, 1);
    }

    #[test]
    fn output_is_valid_json() {
        let layout = Layout {
            name: "quote \" slash \\ tab \t bell \u{7}".into(),
            tags: vec!["ü".into(), "\u{1F600}".into()],
            empty: vec![-1],
        };
        for json in [Json::default(), Json::builder().pretty_print(true).build().unwrap()] {
            let text = json.encode(&layout).unwrap();
            let value: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(value["name"], layout.name.as_str());
            assert_eq!(value["tags"][1], "\u{1F600}");
            assert_eq!(json.decode::<Layout>(&text).unwrap(), layout);
        }
    }

    #[test]
    fn tree_round_trip() {
        let json = Json::default();
        let repo = Repo { name: "sf".into(), stars: 7 };
        let element = json.encode_to_json_element(&Repo::serializer(), &repo).unwrap();
        assert_eq!(element.get("stars"), Some(&JsonElement::from(7_i64)));
        let decoded: Repo = json
            .decode_from_json_element(&Repo::serializer(), &element)
            .unwrap();
        assert_eq!(decoded, repo);
    }

    #[test]
    fn errors_survive_an_async_hop() {
        let json = Json::default();
        let direct = json.decode::<Repo>(r#"{"name": 1}"#).unwrap_err();

        let hopped = block_on(recovery::offload(move || json.decode::<Repo>(r#"{"name": 1}"#)))
            .unwrap_err();
        assert_eq!(hopped.kind(), direct.kind());
        assert_eq!(hopped.message(), direct.message());
        assert_eq!(hopped.cause().map(|cause| cause.message()), Some(direct.message()));
    }

    #[test]
    fn every_error_kind_survives_an_async_hop() {
        fn check(direct: SerialError, hopped: SerialResult<()>, kind: SerialErrorKind) {
            let hopped = hopped.unwrap_err();
            assert_eq!(direct.kind(), kind);
            assert_eq!(hopped.kind(), kind);
            assert_eq!(hopped.message(), direct.message());
            let cause = hopped.cause().unwrap();
            assert_eq!(cause.kind(), kind);
            assert_eq!(cause.message(), direct.message());
        }

        fn offloaded(json: &Json, job: fn(&Json) -> SerialResult<()>) -> SerialResult<()> {
            let json = json.clone();
            block_on(recovery::offload(move || job(&json)))
        }

        let json = Json::default();

        let direct = json.decode::<String>("42").unwrap_err();
        let hopped = offloaded(&json, |json| json.decode::<String>("42").map(drop));
        check(direct, hopped, SerialErrorKind::JsonDecoding);

        let direct = json.encode(&f64::NAN).unwrap_err();
        let hopped = offloaded(&json, |json| json.encode(&f64::NAN).map(drop));
        check(direct, hopped, SerialErrorKind::JsonEncoding);

        let direct = json.decode::<Repo>("{}").unwrap_err();
        let hopped = offloaded(&json, |json| json.decode::<Repo>("{}").map(drop));
        check(direct, hopped, SerialErrorKind::MissingField);

        let direct = json.decode::<Repo>(r#"{"name":"x","stars":1,"fork":true}"#).unwrap_err();
        let hopped = offloaded(&json, |json| {
            json.decode::<Repo>(r#"{"name":"x","stars":1,"fork":true}"#).map(drop)
        });
        check(direct, hopped, SerialErrorKind::UnknownField);
    }

    // -------------------------------------------------------------------------
    // Sealed polymorphism

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(name = "org.example.OwnedProject")]
    struct OwnedProject {
        name: String,
        owner: String,
    }

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(name = "org.example.SimpleProject")]
    struct SimpleProject {
        name: String,
    }

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(sealed, name = "org.example.Project")]
    enum Project {
        Owned(OwnedProject),
        Simple(SimpleProject),
    }

    fn owned() -> Project {
        Project::Owned(OwnedProject {
            name: "tokio".into(),
            owner: "rust".into(),
        })
    }

    #[test]
    fn discriminator_is_the_first_key() {
        let json = Json::default();
        let text = json.encode(&owned()).unwrap();
        assert_eq!(
            text,
            r#"{"type":"org.example.OwnedProject","name":"tokio","owner":"rust"}"#
        );
        assert_eq!(json.decode::<Project>(&text).unwrap(), owned());

        let moved = r#"{"name":"tokio","owner":"rust","type":"org.example.OwnedProject"}"#;
        assert_eq!(json.decode::<Project>(moved).unwrap(), owned());

        let projects = json.decode::<Vec<Project>>(&alloc::format!("[{text}, {text}]")).unwrap();
        assert_eq!(projects.len(), 2);
    }

    #[test]
    fn pretty_polymorphic() {
        let json = Json::builder().pretty_print(true).build().unwrap();
        let text = json.encode(&Project::Simple(SimpleProject { name: "x".into() })).unwrap();
        assert_eq!(
            text,
            "{\n    \"type\": \"org.example.SimpleProject\",\n    \"name\": \"x\"\n}"
        );
    }

    #[test]
    fn unresolvable_discriminators() {
        let json = Json::default();
        let error = json.decode::<Project>(r#"{"name":"x"}"#).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::Serialization);

        let error = json
            .decode::<Project>(r#"{"type":"org.example.ArchivedProject","name":"x"}"#)
            .unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::Serialization);
        assert!(error.message().contains("'org.example.ArchivedProject'"));

        let error = json.decode::<Project>(r#"{"type":1,"name":"x"}"#).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
    }

    #[test]
    fn deep_nesting_fails_without_overflowing() {
        let depth = 100_000;
        let nested = alloc::format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let json = Json::builder().ignore_unknown_keys(true).build().unwrap();

        let input = alloc::format!(
            r#"{{"type":"org.example.SimpleProject","name":"x","extra":{nested}}}"#
        );
        let error = json.decode::<Project>(&input).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);
        assert!(error.message().contains("maximum nesting depth of 512"), "{}", error.message());

        let error = json.parse_to_json_element(&nested).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonDecoding);

        // Skipping an unknown key does not build a tree.
        let input = alloc::format!(r#"{{"name":"x","extra":{nested}}}"#);
        assert_eq!(
            json.decode::<SimpleProject>(&input).unwrap(),
            SimpleProject { name: "x".into() }
        );

        let shallow = alloc::format!("{}{}", "[".repeat(64), "]".repeat(64));
        assert!(json.parse_to_json_element(&shallow).is_ok());
    }

    #[test]
    fn custom_discriminator_key() {
        let json = Json::builder().class_discriminator("#class").build().unwrap();
        let text = json.encode(&owned()).unwrap();
        assert!(text.starts_with(r##"{"#class":"org.example.OwnedProject","##));
        assert_eq!(json.decode::<Project>(&text).unwrap(), owned());
    }

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(name = "Circle")]
    struct Circle {
        radius: f64,
    }

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(name = "Tagged")]
    struct Tagged {
        #[serial(rename = "kind")]
        label: String,
    }

    #[derive(Serializable, Debug, PartialEq)]
    #[serial(sealed, name = "Figure", @ClassDiscriminator::new("kind"))]
    enum Figure {
        Circle(Circle),
        Tagged(Tagged),
    }

    #[test]
    fn annotated_discriminator_and_clash() {
        let json = Json::default();
        let circle = Figure::Circle(Circle { radius: 1.5 });
        let text = json.encode(&circle).unwrap();
        assert_eq!(text, r#"{"kind":"Circle","radius":1.5}"#);
        assert_eq!(json.decode::<Figure>(&text).unwrap(), circle);

        let tagged = Figure::Tagged(Tagged { label: "x".into() });
        let error = json.encode(&tagged).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonEncoding);
        assert!(error.message().contains("named like the class discriminator 'kind'"));
    }

    #[test]
    fn array_polymorphism() {
        let json = Json::builder().use_array_polymorphism(true).build().unwrap();
        let tagged = Figure::Tagged(Tagged { label: "x".into() });
        let text = json.encode(&tagged).unwrap();
        assert_eq!(text, r#"["Tagged",{"kind":"x"}]"#);
        assert_eq!(json.decode::<Figure>(&text).unwrap(), tagged);
        assert!(json.decode::<Figure>(r#"{"kind":"Circle","radius":1.5}"#).is_err());
    }

    // -------------------------------------------------------------------------
    // Open polymorphism

    trait Shape: SerialAny {
        fn area(&self) -> f64;
    }

    open_polymorphic!(dyn Shape, "Shape");

    impl Shape for Circle {
        fn area(&self) -> f64 {
            3.0 * self.radius * self.radius
        }
    }

    impl Shape for String {
        fn area(&self) -> f64 {
            0.0
        }
    }

    fn shapes() -> Json {
        let module = SerializersModule::builder()
            .polymorphic::<Box<dyn Shape>>(|scope| {
                scope.register(Circle::serializer(), |circle: Circle| Box::new(circle));
                scope.register(String::serializer(), |text: String| Box::new(text));
            })
            .build();
        Json::builder().serializers_module(module).build().unwrap()
    }

    #[test]
    fn open_hierarchy_through_the_module() {
        let json = shapes();
        let shape: Box<dyn Shape> = Box::new(Circle { radius: 2.0 });
        let text = json.encode(&shape).unwrap();
        assert_eq!(text, r#"{"type":"Circle","radius":2.0}"#);
        assert_eq!(json.decode::<Box<dyn Shape>>(&text).unwrap().area(), 12.0);

        let error = Json::default()
            .decode::<Box<dyn Shape>>(&text)
            .map(|_| ())
            .unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::Serialization);
    }

    #[test]
    fn primitive_subclass_needs_array_polymorphism() {
        let json = shapes();
        let shape: Box<dyn Shape> = Box::new(String::from("dot"));
        let error = json.encode(&shape).unwrap_err();
        assert_eq!(error.kind(), SerialErrorKind::JsonEncoding);
        assert!(error.message().starts_with("Primitives cannot be serialized polymorphically"));

        let json = Json::builder_from(&json).use_array_polymorphism(true).build().unwrap();
        let text = json.encode(&shape).unwrap();
        assert_eq!(text, r#"["String","dot"]"#);
        assert_eq!(json.decode::<Box<dyn Shape>>(&text).unwrap().area(), 0.0);
    }

    // -------------------------------------------------------------------------
    // Contract violations

    /// Opens a `Repo` composite and closes it as a `Profile`.
    struct MismatchedEnd;

    impl Described for MismatchedEnd {
        fn descriptor(&self) -> &'static SerialDescriptor {
            Repo::serializer().descriptor()
        }
    }

    impl SerializationStrategy<()> for MismatchedEnd {
        fn serialize(&self, encoder: &mut dyn Encoder, _value: &()) -> SerialResult<()> {
            let composite = encoder.begin_structure(Repo::serializer().descriptor())?;
            composite.end_structure(Profile::serializer().descriptor())
        }
    }

    impl DeserializationStrategy<()> for MismatchedEnd {
        fn deserialize(&self, decoder: &mut dyn Decoder) -> SerialResult<()> {
            let composite = decoder.begin_structure(Repo::serializer().descriptor())?;
            composite.end_structure(Profile::serializer().descriptor())
        }
    }

    /// Writes `None` into the non-nullable `name` element of `Repo`.
    struct NullName;

    impl Described for NullName {
        fn descriptor(&self) -> &'static SerialDescriptor {
            Repo::serializer().descriptor()
        }
    }

    impl SerializationStrategy<()> for NullName {
        fn serialize(&self, encoder: &mut dyn Encoder, _value: &()) -> SerialResult<()> {
            let descriptor = self.descriptor();
            let mut composite = encoder.begin_structure(descriptor)?;
            composite.encode_nullable_serializable_element(
                descriptor,
                0,
                &String::serializer(),
                None::<&String>,
            )?;
            composite.end_structure(descriptor)
        }
    }

    #[test]
    #[should_panic(expected = "Composite of 'Repo' ended with the descriptor of 'Profile'")]
    fn encoder_end_with_other_descriptor_panics() {
        let _ = Json::default().encode_to_string(&MismatchedEnd, &());
    }

    #[test]
    #[should_panic(expected = "Composite of 'Repo' ended with the descriptor of 'Profile'")]
    fn decoder_end_with_other_descriptor_panics() {
        let _ = Json::default().decode_from_string::<(), _>(&MismatchedEnd, "{}");
    }

    #[test]
    #[should_panic(expected = "Cannot encode null into non-nullable element 'name' of 'Repo'")]
    fn null_into_non_nullable_element_panics() {
        let _ = Json::default().encode_to_string(&NullName, &());
    }
}
