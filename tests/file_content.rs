use repo_medal::aggregate::{
    file_content, DIRECTORY_PLACEHOLDER, MISSING_CONTENT_PLACEHOLDER,
    UNREADABLE_CONTENT_PLACEHOLDER,
};
use repo_medal::contract::{ContentPayload, EncodedContent, HostError, MockRepositoryHost};
use repo_medal::reference::RepositoryReference;

const FIXTURE: &str = "fn main() {\n    println!(\"héllo, wörld\");\n}\n";

fn repo() -> RepositoryReference {
    RepositoryReference {
        owner: "acme".into(),
        name: "widget".into(),
    }
}

/// Standard base64 of `text`, wrapped at `width` columns with `\n` the way the contents API does.
fn wrapped_base64(text: &str, width: usize) -> String {
    use base64::{engine::general_purpose, Engine as _};
    let encoded = general_purpose::STANDARD.encode(text);
    encoded
        .as_bytes()
        .chunks(width)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

fn host_returning(payload: Result<ContentPayload, HostError>) -> MockRepositoryHost {
    let mut host = MockRepositoryHost::new();
    host.expect_contents()
        .withf(|_, path| path == "src/main.rs")
        .times(1)
        .return_once(move |_, _| payload);
    host
}

#[tokio::test]
async fn wrapped_base64_round_trips_to_the_fixture() {
    for width in [4, 60, 76] {
        let payload = ContentPayload::File(Some(EncodedContent {
            content: wrapped_base64(FIXTURE, width),
        }));
        let host = host_returning(Ok(payload));
        assert_eq!(file_content(&host, &repo(), "src/main.rs").await, FIXTURE);
    }
}

#[tokio::test]
async fn placeholders_for_directory_absent_and_failure() {
    struct TestCase {
        name: &'static str,
        payload: Result<ContentPayload, HostError>,
        expected: &'static str,
    }

    let cases = vec![
        TestCase {
            name: "directory listing",
            payload: Ok(ContentPayload::Directory),
            expected: DIRECTORY_PLACEHOLDER,
        },
        TestCase {
            name: "no inline content",
            payload: Ok(ContentPayload::File(None)),
            expected: MISSING_CONTENT_PLACEHOLDER,
        },
        TestCase {
            name: "blank content",
            payload: Ok(ContentPayload::File(Some(EncodedContent {
                content: "\n".into(),
            }))),
            expected: MISSING_CONTENT_PLACEHOLDER,
        },
        TestCase {
            name: "garbage encoding",
            payload: Ok(ContentPayload::File(Some(EncodedContent {
                content: "***".into(),
            }))),
            expected: UNREADABLE_CONTENT_PLACEHOLDER,
        },
        TestCase {
            name: "request failed",
            payload: Err(HostError::Status {
                url: "https://api.github.com/repos/acme/widget/contents/src/main.rs".into(),
                status: 404,
            }),
            expected: UNREADABLE_CONTENT_PLACEHOLDER,
        },
    ];

    for tc in cases {
        let host = host_returning(tc.payload);
        assert_eq!(
            file_content(&host, &repo(), "src/main.rs").await,
            tc.expected,
            "{}",
            tc.name
        );
    }
}
