//! End-to-end extraction sessions against a temporary project

use errcodes::extract::{
    decode, decoder_url_for, encode_uri_component, minified_message, CodeMap, ErrorExtraction,
    ExtractError, ExtractOptions, ExtractSession, UnfoldablePolicy, DEFAULT_DECODER_URL,
    DEV_MODULE, PROD_MODULE,
};
use errcodes::frontend::{parse, Dialect};
use std::fs;
use std::path::PathBuf;
use swc_core::ecma::ast::Str;
use swc_core::ecma::visit::{Visit, VisitWith};
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn map_path(&self) -> PathBuf {
        self.dir.path().join("scripts").join("codes.json")
    }

    fn out_dir(&self) -> PathBuf {
        self.dir.path().join("src").join("shared").join("errors")
    }

    fn options(&self) -> ExtractOptions {
        ExtractOptions::new(self.map_path(), self.out_dir())
    }

    fn write_map(&self, json: &str) {
        fs::create_dir_all(self.map_path().parent().unwrap()).unwrap();
        fs::write(self.map_path(), json).unwrap();
    }

    fn read_map(&self) -> String {
        fs::read_to_string(self.map_path()).unwrap()
    }

    /// One full session over `sources`
    async fn run(&self, sources: &[&str]) -> CodeMap {
        let mut session = ExtractSession::load(self.options()).await.unwrap();
        for source in sources {
            let _ = session.scan_source(source);
        }
        session.flush().await.unwrap();
        session.code_map().clone()
    }
}

#[tokio::test]
async fn test_first_session_writes_map_and_modules() {
    let project = Project::new();
    project
        .run(&["invariant(input != null, 'Invalid input');"])
        .await;

    assert_eq!(project.read_map(), "{\n  \"0\": \"Invalid input\"\n}\n");
    assert!(project.out_dir().join(DEV_MODULE).is_file());
    assert!(project.out_dir().join(PROD_MODULE).is_file());
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let project = Project::new();
    let sources = [
        "invariant(a, 'First'); invariant(b, 'Expected ' + name + ' to exist');",
        "invariant(c, `Second ${value}`); invariant(d, 'First');",
    ];

    project.run(&sources).await;
    let first = project.read_map();
    project.run(&sources).await;

    assert_eq!(project.read_map(), first);
    assert_eq!(
        first,
        "{\n  \"0\": \"First\",\n  \"1\": \"Expected %s to exist\",\n  \"2\": \"Second %s\"\n}\n"
    );
}

#[tokio::test]
async fn test_removed_messages_keep_their_codes() {
    let project = Project::new();
    project
        .run(&["invariant(a, 'Old message'); invariant(b, 'Kept');"])
        .await;

    // The old message is gone from source
    let map = project.run(&["invariant(b, 'Kept'); invariant(c, 'New');"]).await;
    assert_eq!(map.get(0), Some("Old message"));
    assert_eq!(map.get(2), Some("New"));

    // ...and comes back with its old code
    let mut session = ExtractSession::load(project.options()).await.unwrap();
    let report = session.scan_source("invariant(a, 'Old message');").unwrap();
    assert_eq!(report.sites[0].id, 0);
    assert!(report.allocated.is_empty());
}

#[tokio::test]
async fn test_gaps_are_not_filled() {
    let project = Project::new();
    project.write_map(r#"{"0": "zero", "1": "one", "3": "three"}"#);

    let map = project.run(&["invariant(x, 'four');"]).await;
    assert_eq!(map.get(4), Some("four"));
    assert_eq!(map.get(2), None);
}

#[tokio::test]
async fn test_unparsable_map_starts_empty() {
    let project = Project::new();
    project.write_map("not json at all");

    let map = project.run(&["invariant(x, 'Fresh');"]).await;
    assert_eq!(map.iter().collect::<Vec<_>>(), vec![(0, "Fresh")]);
}

#[tokio::test]
async fn test_bad_file_does_not_block_flush() {
    let project = Project::new();
    let mut session = ExtractSession::load(project.options()).await.unwrap();

    assert!(session.scan_source("invariant(x, 'Lost'); {").is_err());
    session.scan_source("invariant(x, 'Kept');").unwrap();
    session.flush().await.unwrap();

    assert_eq!(project.read_map(), "{\n  \"0\": \"Kept\"\n}\n");
}

#[tokio::test]
async fn test_strict_policy_skips_file() {
    let project = Project::new();
    let options = ExtractOptions {
        policy: UnfoldablePolicy::Reject,
        ..project.options()
    };
    let mut session = ExtractSession::load(options).await.unwrap();

    assert!(session
        .scan_source("invariant(a, 'Fine'); invariant(b, 'Dynamic ' + reason);")
        .is_err());
    assert!(session.code_map().is_empty());
}

#[tokio::test]
async fn test_missing_map_path_writes_nothing() {
    let project = Project::new();
    let options = ExtractOptions {
        error_map_path: None,
        ..project.options()
    };

    let err = ExtractSession::load(options).await.unwrap_err();
    assert!(matches!(err, ExtractError::Config(_)));
    assert_eq!(fs::read_dir(project.dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_modern_syntax_is_scanned() {
    let source = r#"
        import React, { useState } from 'react';
        import invariant from 'shared/invariant';

        type Props = { name?: string; children: React.ReactNode };

        @observer
        export default class Panel extends React.Component<Props> {
            private count: number = 0;

            render(): JSX.Element {
                invariant(this.props.name, 'Panel requires a name');
                return <div className="panel">{this.props.children}</div>;
            }
        }

        export function usePanel<T>(value: T, ...rest: unknown[]) {
            const [state] = useState(value);
            invariant(state !== undefined, `Unknown panel state: ${String(state)}`, ...rest);
            return state as T;
        }

        export const check = (items: string[]) =>
            items.forEach((item) => invariant(item, 'Item ' + item + ' is empty'));

        export const cast = <T,>(value: unknown): T => value as T;
    "#;

    let project = Project::new();
    let map = project.run(&[source]).await;
    assert_eq!(
        map.iter().collect::<Vec<_>>(),
        vec![
            (0, "Panel requires a name"),
            (1, "Unknown panel state: %s"),
            (2, "Item %s is empty"),
        ]
    );
}

#[tokio::test]
async fn test_pipeline_adapter() {
    let project = Project::new();
    let mut plugin = ErrorExtraction::new(project.options()).await.unwrap();

    let output = plugin.transform("invariant(x, 'From plugin');").await.unwrap();
    assert_eq!(output.code, "invariant(x, 'From plugin');");
    assert!(output.map.is_none());
    assert!(plugin.transform("invariant(x, ").await.is_none());

    assert_eq!(project.read_map(), "{\n  \"0\": \"From plugin\"\n}\n");
}

/// String literals of a generated module, in source order
struct Strings(Vec<String>);

impl Visit for Strings {
    fn visit_str(
        &mut self,
        node: &Str,
    ) {
        self.0.push(node.value.to_string());
    }
}

#[tokio::test]
async fn test_generated_prod_module_matches_decoder_url() {
    let project = Project::new();
    project.run(&[]).await;

    let dev = fs::read_to_string(project.out_dir().join(DEV_MODULE)).unwrap();
    assert!(parse(&dev, Dialect::JavaScript).is_ok());

    let prod = fs::read_to_string(project.out_dir().join(PROD_MODULE)).unwrap();
    let parsed = parse(&prod, Dialect::JavaScript).unwrap();
    let mut strings = Strings(Vec::new());
    parsed.node().visit_with(&mut strings);

    // `url = base + code`, then `url += separator + encodeURIComponent(arg)` per argument
    let (base, separator) = (&strings.0[0], &strings.0[1]);
    assert_eq!(base, DEFAULT_DECODER_URL);
    let args = ["a", "b"];
    let mut url = format!("{}{}", base, 3);
    for arg in args {
        url.push_str(separator);
        url.push_str(&encode_uri_component(arg));
    }
    assert_eq!(url, decoder_url_for(DEFAULT_DECODER_URL, 3, &args));
}

#[test]
fn test_prod_error_url() {
    let url = decoder_url_for(DEFAULT_DECODER_URL, 3, &["a", "b"]);
    assert_eq!(url, format!("{}3&args[]=a&args[]=b", DEFAULT_DECODER_URL));

    let message = minified_message(DEFAULT_DECODER_URL, 3, &["a b", "c&d"]);
    assert!(message.contains("invariant=3&args[]=a%20b&args[]=c%26d for the full message"));
}

#[test]
fn test_decode_round_trip() {
    let map = CodeMap::from_json(r#"{"1": "Expected %s to exist"}"#).unwrap();
    assert_eq!(
        decode(&map, 1, &["the panel"]).as_deref(),
        Some("Expected the panel to exist")
    );
}
