//! Example tools the demo wires into the chat.

use toolchat::chat::Chat;
use toolchat::errors::{ToolError, ToolResult};
use toolchat::models::tool::Arguments;
use toolchat::schema::ToolDef;

use crate::orders;

pub fn register_all(chat: &mut Chat) -> ToolResult<()> {
    chat.register_tool(get_weather())?;
    chat.register_tool(get_order())?;
    chat.register_tool(get_customer())?;
    chat.register_tool(list_orders())?;
    chat.register_tool(calculate())?;
    Ok(())
}

fn get_weather() -> ToolDef {
    ToolDef::new("get_weather", |args: Arguments| async move {
        Ok(format!("It's sunny in {}!", args.require("city")?))
    })
    .docs("Get the weather for a city")
    .param("city")
}

fn get_order() -> ToolDef {
    ToolDef::new("get_order", |args: Arguments| async move {
        let order_id = args.require("order_id")?;
        Ok(match orders::find_order(order_id) {
            Some(order) => format!(
                "Order {}: {} (Qty: {}, Price: ${}, Status: {})",
                order.id, order.product, order.quantity, order.price, order.status
            ),
            None => format!("Order {} not found", order_id),
        })
    })
    .docs("Get order details by order ID")
    .param("order_id")
}

fn get_customer() -> ToolDef {
    ToolDef::new("get_customer", |args: Arguments| async move {
        let customer_id = args.require("customer_id")?;
        Ok(match orders::find_customer(customer_id) {
            Some(customer) => {
                let order_list = orders::orders_for(customer.id)
                    .iter()
                    .map(|order| order.id)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "Customer {} (Email: {}, Phone: {}, Orders: {})",
                    customer.name, customer.email, customer.phone, order_list
                )
            }
            None => format!("Customer {} not found", customer_id),
        })
    })
    .docs("Get customer details by customer ID")
    .param("customer_id")
}

fn list_orders() -> ToolDef {
    ToolDef::new("list_orders", |_args: Arguments| async move {
        Ok(orders::ORDERS
            .iter()
            .map(|order| format!("{}: {} - {}", order.id, order.product, order.status))
            .collect::<Vec<_>>()
            .join("\n"))
    })
    .docs("List all orders in the system")
}

fn calculate() -> ToolDef {
    ToolDef::new("calculate", |args: Arguments| async move {
        let expression = args.require("expression")?;
        evaluate_expression(expression)
            .map(|result| result.to_string())
            .map_err(ToolError::ExecutionError)
    })
    .docs("Evaluate a mathematical expression")
    .param("expression")
}

/// Small recursive evaluator for `+ - * / ^` and parentheses. Keeps the
/// model away from anything resembling eval().
fn evaluate_expression(expression: &str) -> Result<f64, String> {
    let expression: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    eval(&expression)
}

fn eval(expr: &str) -> Result<f64, String> {
    if expr.is_empty() {
        return Err("empty expression".to_string());
    }

    // Innermost parentheses first
    if let Some(start) = expr.rfind('(') {
        let end = expr[start..]
            .find(')')
            .map(|offset| start + offset)
            .ok_or_else(|| "unbalanced parentheses".to_string())?;
        let inner = eval(&expr[start + 1..end])?;
        let rewritten = format!("{}{}{}", &expr[..start], inner, &expr[end + 1..]);
        return eval(&rewritten);
    }
    if expr.contains(')') {
        return Err("unbalanced parentheses".to_string());
    }

    let bytes = expr.as_bytes();

    // Addition and subtraction bind loosest; split at the last one so the
    // left side stays left-associative. A sign after a digit is binary,
    // anything else is unary and belongs to the number.
    for i in (1..bytes.len()).rev() {
        let op = bytes[i];
        if (op == b'+' || op == b'-') && matches!(bytes[i - 1], b'0'..=b'9' | b'.') {
            let left = eval(&expr[..i])?;
            let right = eval(&expr[i + 1..])?;
            return Ok(if op == b'+' { left + right } else { left - right });
        }
    }

    for i in (0..bytes.len()).rev() {
        let op = bytes[i];
        if op == b'*' || op == b'/' {
            let left = eval(&expr[..i])?;
            let right = eval(&expr[i + 1..])?;
            if op == b'/' && right == 0.0 {
                return Err("division by zero".to_string());
            }
            return Ok(if op == b'*' { left * right } else { left / right });
        }
    }

    if let Some(i) = expr.find('^') {
        let left = eval(&expr[..i])?;
        let right = eval(&expr[i + 1..])?;
        return Ok(left.powf(right));
    }

    expr.parse::<f64>()
        .map_err(|e| format!("parse error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_expression() {
        assert!((evaluate_expression("2 + 2").unwrap() - 4.0).abs() < f64::EPSILON);
        assert!((evaluate_expression("15 * 23").unwrap() - 345.0).abs() < f64::EPSILON);
        assert!((evaluate_expression("(2 + 3) * 4").unwrap() - 20.0).abs() < f64::EPSILON);
        assert!((evaluate_expression("2 ^ 8").unwrap() - 256.0).abs() < f64::EPSILON);
        assert!((evaluate_expression("10 - 2 - 3").unwrap() - 5.0).abs() < f64::EPSILON);
        assert!((evaluate_expression("-4 + 6").unwrap() - 2.0).abs() < f64::EPSILON);
        assert!(evaluate_expression("1 / 0").is_err());
        assert!(evaluate_expression("(1 + 2").is_err());
        assert!(evaluate_expression("two").is_err());
    }

    #[tokio::test]
    async fn test_get_order_formats_like_the_store() {
        let output = get_order()
            .invoke([("order_id", "O1")].into_iter().collect())
            .await
            .unwrap();
        assert_eq!(
            output,
            "Order O1: Laptop (Qty: 1, Price: $1200, Status: shipped)"
        );

        let missing = get_order()
            .invoke([("order_id", "O9")].into_iter().collect())
            .await
            .unwrap();
        assert_eq!(missing, "Order O9 not found");
    }

    #[tokio::test]
    async fn test_get_customer_lists_their_orders() {
        let output = get_customer()
            .invoke([("customer_id", "C1")].into_iter().collect())
            .await
            .unwrap();
        assert_eq!(
            output,
            "Customer John Doe (Email: john@example.com, Phone: 555-0123, Orders: O1, O2)"
        );
    }

    #[tokio::test]
    async fn test_list_orders_mentions_every_order() {
        let output = list_orders()
            .invoke(Default::default())
            .await
            .unwrap();
        for id in ["O1", "O2", "O3", "O4"] {
            assert!(output.contains(id));
        }
    }

    #[test]
    fn test_schemas_advertise_string_parameters() {
        let schema = calculate().schema();
        assert_eq!(schema.description, "Evaluate a mathematical expression");
        assert_eq!(
            schema.input_schema["properties"]["expression"]["type"],
            "string"
        );
        assert_eq!(
            schema.input_schema["required"],
            serde_json::json!(["expression"])
        );
    }
}
