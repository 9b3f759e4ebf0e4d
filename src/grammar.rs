//! Declarative grammar table for the command DSL.
//!
//! Every command form is a `CommandSchema`: a keyword path after the verb
//! (one word for `BOX`, two for `BOOLEAN CUT` or `FACE WIRE`) plus an
//! ordered field list. The parser is entirely table-driven; adding a
//! command form means adding a row here and an ACT variant.

/// The type of one schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Three numbers: `x y z`.
    Vec3,
    /// Two numbers: `dx dy`.
    Vec2,
    /// One number.
    Scalar,
    /// One number, interpreted as degrees.
    Angle,
    /// One embedded command, parsed recursively.
    SubCommand,
    /// One or more embedded commands joined by top-level `AND`.
    SubCommandList,
    /// A run of numbers forming `min` or more `x y z` triples.
    Points { min: usize },
    /// An optional trailing `<keyword> <word>` pair (folder names).
    OptionalText,
}

/// One named, keyword-introduced field of a command.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Keyword word(s) introducing the field; empty for an unkeyed field
    /// (the base shape of `THICKSOLID`).
    pub keyword: &'static [&'static str],
    /// Field name used in diagnostics.
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(keyword: &'static [&'static str], name: &'static str, kind: FieldKind) -> Field {
    Field {
        keyword,
        name,
        kind,
    }
}

/// A command form: verb, noun path, ordered fields.
#[derive(Debug, Clone, Copy)]
pub struct CommandSchema {
    pub verb: &'static str,
    /// Noun keyword path; multi-word for booleans and face variants.
    pub noun: &'static [&'static str],
    /// Canonical display name, e.g. `"BOOLEAN CUT"`.
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// The full grammar. Field order here is the textual grammar order; the
/// reverse serializer re-emits fields in exactly this order.
pub static SCHEMAS: &[CommandSchema] = &[
    CommandSchema {
        verb: "CREATE",
        noun: &["BOX"],
        name: "BOX",
        fields: &[
            field(&["ORIGIN"], "ORIGIN", FieldKind::Vec3),
            field(&["SIZE"], "SIZE", FieldKind::Vec2),
            field(&["HEIGHT"], "HEIGHT", FieldKind::Scalar),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["ARC"],
        name: "ARC",
        fields: &[
            field(&["CENTER"], "CENTER", FieldKind::Vec3),
            field(&["START"], "START", FieldKind::Vec3),
            field(&["NORMAL"], "NORMAL", FieldKind::Vec3),
            field(&["ANGLE"], "ANGLE", FieldKind::Angle),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["CIRCLE"],
        name: "CIRCLE",
        fields: &[
            field(&["CENTER"], "CENTER", FieldKind::Vec3),
            field(&["RADIUS"], "RADIUS", FieldKind::Scalar),
            field(&["NORMAL"], "NORMAL", FieldKind::Vec3),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["LINE"],
        name: "LINE",
        fields: &[
            field(&["FROM"], "FROM", FieldKind::Vec3),
            field(&["TO"], "TO", FieldKind::Vec3),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["POLYGON"],
        name: "POLYGON",
        fields: &[field(&["POINTS"], "POINTS", FieldKind::Points { min: 3 })],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["RECTANGLE"],
        name: "RECTANGLE",
        fields: &[
            field(&["ORIGIN"], "ORIGIN", FieldKind::Vec3),
            field(&["SIZE"], "SIZE", FieldKind::Vec2),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["FOLDER"],
        name: "FOLDER",
        fields: &[field(&["NAME"], "NAME", FieldKind::OptionalText)],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["PRISM"],
        name: "PRISM",
        fields: &[
            field(&["SECTION"], "SECTION", FieldKind::SubCommand),
            field(&["LENGTH"], "LENGTH", FieldKind::Scalar),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["REVOLVE"],
        name: "REVOLVE",
        fields: &[
            field(&["PROFILE"], "PROFILE", FieldKind::SubCommand),
            field(&["AXIS", "ORIGIN"], "AXIS ORIGIN", FieldKind::Vec3),
            field(&["DIRECTION"], "DIRECTION", FieldKind::Vec3),
            field(&["ANGLE"], "ANGLE", FieldKind::Angle),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["SWEEP"],
        name: "SWEEP",
        fields: &[
            field(&["PROFILE"], "PROFILE", FieldKind::SubCommand),
            field(&["PATH"], "PATH", FieldKind::SubCommand),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["BEZIER"],
        name: "BEZIER",
        fields: &[field(&["POINTS"], "POINTS", FieldKind::Points { min: 2 })],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["BOOLEAN", "CUT"],
        name: "BOOLEAN CUT",
        fields: &[
            field(&["FIRST"], "FIRST", FieldKind::SubCommand),
            field(&["SECOND"], "SECOND", FieldKind::SubCommand),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["BOOLEAN", "COMMON"],
        name: "BOOLEAN COMMON",
        fields: &[
            field(&["FIRST"], "FIRST", FieldKind::SubCommand),
            field(&["SECOND"], "SECOND", FieldKind::SubCommand),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["BOOLEAN", "FUSE"],
        name: "BOOLEAN FUSE",
        fields: &[
            field(&["FIRST"], "FIRST", FieldKind::SubCommand),
            field(&["SECOND"], "SECOND", FieldKind::SubCommand),
        ],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["FACE", "WIRE"],
        name: "FACE WIRE",
        fields: &[field(&[], "WIRE", FieldKind::SubCommand)],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["FACE", "EDGES"],
        name: "FACE EDGES",
        fields: &[field(&[], "EDGES", FieldKind::SubCommandList)],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["WIRE"],
        name: "WIRE",
        fields: &[field(&["EDGES"], "EDGES", FieldKind::SubCommandList)],
    },
    CommandSchema {
        verb: "CREATE",
        noun: &["THICKSOLID"],
        name: "THICKSOLID",
        fields: &[
            field(&[], "BASE", FieldKind::SubCommand),
            field(&["THICKNESS"], "THICKNESS", FieldKind::Scalar),
        ],
    },
];

/// Look up the schema for `verb` followed by the word sequence `nouns`.
///
/// Returns the schema and the number of noun words it consumed. The longest
/// matching noun path wins, so `BOOLEAN CUT` never half-matches a bare
/// `BOOLEAN` and `FACE WIRE` / `FACE EDGES` stay distinct forms.
#[must_use]
pub fn lookup(verb: &str, nouns: &[&str]) -> Option<(&'static CommandSchema, usize)> {
    let mut best: Option<(&'static CommandSchema, usize)> = None;
    for schema in SCHEMAS {
        if !schema.verb.eq_ignore_ascii_case(verb) {
            continue;
        }
        let path = schema.noun;
        if path.len() > nouns.len() {
            continue;
        }
        let matches = path
            .iter()
            .zip(nouns)
            .all(|(kw, word)| kw.eq_ignore_ascii_case(word));
        if matches && best.map_or(true, |(b, _)| path.len() > b.noun.len()) {
            best = Some((schema, path.len()));
        }
    }
    best
}
