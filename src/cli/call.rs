//! Raw REST method calls

use crate::cli::{CallArgs, CommandContext};
use photoop::client::{JsonDecoder, RequestSpec, TextDecoder};
use photoop::error::Result;

/// Build the request for a raw call
fn request_spec(args: &CallArgs) -> RequestSpec {
    let mut spec = args
        .params
        .iter()
        .fold(RequestSpec::rest(&args.method), |spec, (k, v)| {
            spec.param(k.as_str(), v.as_str())
        });
    if args.post {
        spec = spec.post();
    }
    if args.no_auth {
        spec = spec.anonymous();
    }
    spec
}

/// Call a REST method and print the response body
pub async fn run(ctx: &CommandContext, args: &CallArgs) -> Result<()> {
    let spec = request_spec(args);

    if args.text {
        let body = ctx.client.request(&spec, &TextDecoder).await?;
        println!("{}", body);
    } else {
        let value = ctx
            .client
            .request(&spec, &JsonDecoder::<serde_json::Value>::new())
            .await?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
