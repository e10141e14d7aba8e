//! The closed set of recognized susetags tags.

use solv_core::AttrKey;

/// A recognized tag, identified by the three characters after `=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Pkg,
    Pat,
    Prv,
    Req,
    Prq,
    Obs,
    Con,
    Rec,
    Sup,
    Enh,
    Sug,
    Fre,
    Prc,
    Psg,
    Grp,
    Lic,
    Loc,
    Src,
    Siz,
    Tim,
    Kwd,
    Aut,
    Sum,
    Des,
    Eul,
    Ins,
    Del,
    Shr,
    Ver,
}

/// Which dependency list of a solvable a tag feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepList {
    Provides,
    Requires,
    Conflicts,
    Obsoletes,
    Recommends,
    Supplements,
    Enhances,
    Suggests,
    Freshens,
}

impl Tag {
    /// Match a three-character tag code.
    pub fn from_code(code: &str) -> Option<Tag> {
        let tag = match code {
            "Pkg" => Tag::Pkg,
            "Pat" => Tag::Pat,
            "Prv" => Tag::Prv,
            "Req" => Tag::Req,
            "Prq" => Tag::Prq,
            "Obs" => Tag::Obs,
            "Con" => Tag::Con,
            "Rec" => Tag::Rec,
            "Sup" => Tag::Sup,
            "Enh" => Tag::Enh,
            "Sug" => Tag::Sug,
            "Fre" => Tag::Fre,
            "Prc" => Tag::Prc,
            "Psg" => Tag::Psg,
            "Grp" => Tag::Grp,
            "Lic" => Tag::Lic,
            "Loc" => Tag::Loc,
            "Src" => Tag::Src,
            "Siz" => Tag::Siz,
            "Tim" => Tag::Tim,
            "Kwd" => Tag::Kwd,
            "Aut" => Tag::Aut,
            "Sum" => Tag::Sum,
            "Des" => Tag::Des,
            "Eul" => Tag::Eul,
            "Ins" => Tag::Ins,
            "Del" => Tag::Del,
            "Shr" => Tag::Shr,
            "Ver" => Tag::Ver,
            _ => return None,
        };
        Some(tag)
    }

    /// Split a logical line `=Xyz: body` into its tag and raw body.
    ///
    /// The body starts right after the colon; lines that do not have the
    /// fixed-width `=Xyz:` shape or carry an unknown code yield `None`.
    pub fn parse_line(line: &str) -> Option<(Tag, &str)> {
        let bytes = line.as_bytes();
        if bytes.len() < 5 || bytes[0] != b'=' || bytes[4] != b':' {
            return None;
        }
        let tag = Tag::from_code(line.get(1..4)?)?;
        Some((tag, &line[5..]))
    }

    /// Whether an opening `+Xyz:` of this tag spans multiple physical lines.
    pub fn is_cumulative(self) -> bool {
        matches!(self, Tag::Des | Tag::Eul | Tag::Ins | Tag::Del | Tag::Aut)
    }

    /// Whether this tag starts a new package or pattern record.
    pub fn is_record_start(self) -> bool {
        matches!(self, Tag::Pkg | Tag::Pat)
    }

    /// The dependency list this tag appends to, if it is a dependency tag.
    pub fn dep_list(self) -> Option<DepList> {
        let list = match self {
            Tag::Prv => DepList::Provides,
            Tag::Req | Tag::Prq => DepList::Requires,
            Tag::Obs => DepList::Obsoletes,
            Tag::Con => DepList::Conflicts,
            Tag::Rec | Tag::Prc => DepList::Recommends,
            Tag::Sup => DepList::Supplements,
            Tag::Enh => DepList::Enhances,
            Tag::Sug | Tag::Psg => DepList::Suggests,
            Tag::Fre => DepList::Freshens,
            _ => return None,
        };
        Some(list)
    }

    /// Attribute key written by a blob-valued tag.
    pub fn blob_key(self) -> Option<AttrKey> {
        let key = match self {
            Tag::Aut => AttrKey::Authors,
            Tag::Des => AttrKey::Description,
            Tag::Eul => AttrKey::Eula,
            Tag::Ins => AttrKey::MessageIns,
            Tag::Del => AttrKey::MessageDel,
            _ => return None,
        };
        Some(key)
    }

    /// Attribute key written by a local-id-valued tag.
    pub fn local_id_key(self) -> Option<AttrKey> {
        let key = match self {
            Tag::Grp => AttrKey::Group,
            Tag::Lic => AttrKey::License,
            Tag::Kwd => AttrKey::Keywords,
            _ => return None,
        };
        Some(key)
    }
}
