mod evaluate;
mod traversal;
