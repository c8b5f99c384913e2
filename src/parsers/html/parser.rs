use std::cell::RefCell;

use encoding_rs::Encoding;
use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use super::dom::{Attribute, Document, Element, Node};
use super::serializer::escape_text;
use super::utils::{is_void_tag, RAW_TEXT_TAGS};

/// Collects tokenizer events into a flat node sequence
#[derive(Default)]
struct NodeCollector {
    nodes: RefCell<Vec<Node>>,
}

impl NodeCollector {
    /// Raw-text content is escaped like any other text; the serializer
    /// restores it only where a `script` element still encloses it.
    fn push_text(&self, text: &str) {
        let literal = escape_text(text);

        let mut nodes = self.nodes.borrow_mut();
        match nodes.last_mut() {
            Some(Node::Text(previous)) => previous.push_str(&literal),
            _ => nodes.push(Node::Text(literal)),
        }
    }

    fn open_tag(&self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();
        let attrs = tag
            .attrs
            .iter()
            .map(|attr| Attribute::new(attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        let switch_to = raw_kind_for(&name);

        self.nodes.borrow_mut().push(Node::Element(Element::new(name, attrs)));

        match switch_to {
            Some(kind) => TokenSinkResult::RawData(kind),
            None => TokenSinkResult::Continue,
        }
    }

    fn close_tag(&self, tag: Tag) {
        let name = tag.name.to_string();
        if !is_void_tag(&name) {
            self.nodes.borrow_mut().push(Node::closing(name));
        }
    }
}

impl TokenSink for NodeCollector {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => return self.open_tag(tag),
                TagKind::EndTag => self.close_tag(tag),
            },
            Token::CharacterTokens(text) => self.push_text(&text),
            // Comments, doctypes, NULs and parse errors are dropped
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

fn raw_kind_for(tag_name: &str) -> Option<RawKind> {
    if !RAW_TEXT_TAGS.contains(&tag_name) {
        return None;
    }

    Some(match tag_name {
        "script" => RawKind::ScriptData,
        "title" | "textarea" => RawKind::Rcdata,
        _ => RawKind::Rawtext,
    })
}

/// Tokenizes markup into a flat document
pub fn parse_document(markup: &str) -> Document {
    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(markup));

    let tokenizer = Tokenizer::new(NodeCollector::default(), TokenizerOpts::default());
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    Document::new(tokenizer.sink.nodes.take())
}

/// Decodes raw bytes using the given charset label (falling back to lossy UTF-8)
pub fn decode_input(data: &[u8], document_encoding: &str) -> String {
    match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => {
            let (string, _, _) = encoding.decode(data);
            string.into_owned()
        }
        None => String::from_utf8_lossy(data).into_owned(),
    }
}

/// Converts raw HTML bytes to a flat document
pub fn html_to_document(data: &[u8], document_encoding: &str) -> Document {
    parse_document(&decode_input(data, document_encoding))
}
