use anyhow::Result;
use dotenv::dotenv;
use futures::StreamExt;
use toolchat::chat::{Chat, LoopConfig};
use toolchat::models::tool::Arguments;
use toolchat::providers::anthropic::{AnthropicProvider, ANTHROPIC_DEFAULT_MODEL};
use toolchat::schema::ToolDef;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let provider = AnthropicProvider::from_env()?;
    let mut chat = Chat::new(Box::new(provider), ANTHROPIC_DEFAULT_MODEL);

    chat.register_tool(
        ToolDef::new("get_weather", |args: Arguments| async move {
            Ok(format!("It's sunny in {}!", args.require("city")?))
        })
        .docs("Get the weather for a city")
        .param("city"),
    )?;

    chat.register_tool(
        ToolDef::new("multiply", |args: Arguments| async move {
            let a: f64 = args.require("a")?.parse().unwrap_or(0.0);
            let b: f64 = args.require("b")?.parse().unwrap_or(0.0);
            Ok((a * b).to_string())
        })
        .docs("Multiply two numbers")
        .param("a")
        .param("b"),
    )?;

    let user_message = "What's the weather in Tokyo? Also, multiply 15 by 23 for me.";
    println!("User: {}\n", user_message);

    let mut stream = chat.tool_loop(user_message, LoopConfig::default());
    let mut step = 1;
    while let Some(reply) = stream.next().await {
        let reply = reply?;
        println!("Step {}:", step);

        for request in reply.tool_requests() {
            println!("  Tool: {}({:?})", request.call.name, request.call.arguments);
        }

        let text = reply.text();
        if !text.is_empty() {
            println!("  Response: {}", text);
        }

        println!();
        step += 1;
    }

    Ok(())
}
