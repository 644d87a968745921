//! Sample order and customer data for the demo tools.

pub struct Order {
    pub id: &'static str,
    pub product: &'static str,
    pub quantity: u32,
    pub price: u32,
    pub status: &'static str,
    pub customer_id: &'static str,
}

pub struct Customer {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
}

pub const ORDERS: &[Order] = &[
    Order {
        id: "O1",
        product: "Laptop",
        quantity: 1,
        price: 1200,
        status: "shipped",
        customer_id: "C1",
    },
    Order {
        id: "O2",
        product: "Mouse",
        quantity: 2,
        price: 25,
        status: "delivered",
        customer_id: "C1",
    },
    Order {
        id: "O3",
        product: "Keyboard",
        quantity: 1,
        price: 75,
        status: "processing",
        customer_id: "C2",
    },
    Order {
        id: "O4",
        product: "Monitor",
        quantity: 2,
        price: 300,
        status: "shipped",
        customer_id: "C2",
    },
];

pub const CUSTOMERS: &[Customer] = &[
    Customer {
        id: "C1",
        name: "John Doe",
        email: "john@example.com",
        phone: "555-0123",
    },
    Customer {
        id: "C2",
        name: "Jane Smith",
        email: "jane@example.com",
        phone: "555-0456",
    },
];

pub fn find_order(id: &str) -> Option<&'static Order> {
    ORDERS.iter().find(|order| order.id == id)
}

pub fn find_customer(id: &str) -> Option<&'static Customer> {
    CUSTOMERS.iter().find(|customer| customer.id == id)
}

pub fn orders_for(customer_id: &str) -> Vec<&'static Order> {
    ORDERS
        .iter()
        .filter(|order| order.customer_id == customer_id)
        .collect()
}
